use crate::error::HistoryResult;
use crate::query::{HistoryQuery, ObservationFilter, ProjectScope};
use recollect_telemetry::{Observation, SessionSummary};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;

const OBSERVATION_COLUMNS: &str = "o.id, o.session_id, o.project, o.type, o.title, o.subtitle, \
     o.narrative, o.facts, o.concepts, o.files_read, o.files_modified, o.prompt_number, \
     o.discovery_tokens, o.created_at, o.created_at_epoch";

const SUMMARY_COLUMNS: &str = "ss.id, ss.session_id, ss.project, ss.request, ss.investigated, \
     ss.learned, ss.completed, ss.next_steps, ss.notes, ss.prompt_number, ss.discovery_tokens, \
     ss.created_at, ss.created_at_epoch";

/// SQLite-backed session history
pub struct SqliteHistory {
    conn: Connection,
}

impl SqliteHistory {
    pub fn open(db_path: &Path) -> HistoryResult<Self> {
        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> HistoryResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> HistoryResult<()> {
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL UNIQUE,
                project TEXT NOT NULL,
                started_at_epoch INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS session_plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_db_id INTEGER NOT NULL UNIQUE
                    REFERENCES sessions(id) ON DELETE CASCADE,
                plan_path TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS observations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                project TEXT NOT NULL,
                type TEXT NOT NULL,
                title TEXT,
                subtitle TEXT,
                narrative TEXT,
                facts TEXT NOT NULL DEFAULT '[]',
                concepts TEXT NOT NULL DEFAULT '[]',
                files_read TEXT NOT NULL DEFAULT '[]',
                files_modified TEXT NOT NULL DEFAULT '[]',
                prompt_number INTEGER,
                discovery_tokens INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                created_at_epoch INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_observations_project
                ON observations(project, created_at_epoch);
            CREATE TABLE IF NOT EXISTS session_summaries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                project TEXT NOT NULL,
                request TEXT,
                investigated TEXT,
                learned TEXT,
                completed TEXT,
                next_steps TEXT,
                notes TEXT,
                prompt_number INTEGER,
                discovery_tokens INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                created_at_epoch INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_summaries_project
                ON session_summaries(project, created_at_epoch);
            ",
        )?;
        Ok(())
    }

    /// Register a session, returning its row id (existing sessions are kept)
    pub fn start_session(&self, session_id: &str, project: &str, started_at_epoch: i64) -> HistoryResult<i64> {
        self.conn.execute(
            "INSERT OR IGNORE INTO sessions (session_id, project, started_at_epoch) VALUES (?1, ?2, ?3)",
            params![session_id, project, started_at_epoch],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM sessions WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Associate a session with a plan file, replacing any earlier plan
    ///
    /// Returns false when the session is unknown.
    pub fn associate_plan(&self, session_id: &str, plan_path: &str) -> HistoryResult<bool> {
        let session_db_id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM sessions WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(session_db_id) = session_db_id else {
            tracing::warn!("cannot associate plan with unknown session {}", session_id);
            return Ok(false);
        };

        self.conn.execute(
            "INSERT INTO session_plans (session_db_id, plan_path) VALUES (?1, ?2)
             ON CONFLICT(session_db_id) DO UPDATE SET plan_path = excluded.plan_path",
            params![session_db_id, plan_path],
        )?;
        Ok(true)
    }

    /// Store an observation; the id is assigned by the database
    pub fn insert_observation(&self, obs: &Observation) -> HistoryResult<i64> {
        self.conn.execute(
            "INSERT INTO observations (
                session_id, project, type, title, subtitle, narrative, facts, concepts,
                files_read, files_modified, prompt_number, discovery_tokens, created_at,
                created_at_epoch
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                obs.session_id,
                obs.project,
                obs.obs_type,
                obs.title,
                obs.subtitle,
                obs.narrative,
                serde_json::to_string(&obs.facts)?,
                serde_json::to_string(&obs.concepts)?,
                serde_json::to_string(&obs.files_read)?,
                serde_json::to_string(&obs.files_modified)?,
                obs.prompt_number,
                obs.discovery_tokens,
                obs.created_at,
                obs.created_at_epoch,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Store a session summary; the id is assigned by the database
    pub fn insert_summary(&self, summary: &SessionSummary) -> HistoryResult<i64> {
        self.conn.execute(
            "INSERT INTO session_summaries (
                session_id, project, request, investigated, learned, completed, next_steps,
                notes, prompt_number, discovery_tokens, created_at, created_at_epoch
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                summary.session_id,
                summary.project,
                summary.request,
                summary.investigated,
                summary.learned,
                summary.completed,
                summary.next_steps,
                summary.notes,
                summary.prompt_number,
                summary.discovery_tokens,
                summary.created_at,
                summary.created_at_epoch,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn row_to_observation(row: &Row) -> rusqlite::Result<Observation> {
        Ok(Observation {
            id: row.get(0)?,
            session_id: row.get(1)?,
            project: row.get(2)?,
            obs_type: row.get(3)?,
            title: row.get(4)?,
            subtitle: row.get(5)?,
            narrative: row.get(6)?,
            facts: parse_list(row.get(7)?, "facts"),
            concepts: parse_list(row.get(8)?, "concepts"),
            files_read: parse_list(row.get(9)?, "files_read"),
            files_modified: parse_list(row.get(10)?, "files_modified"),
            prompt_number: row.get(11)?,
            discovery_tokens: row.get::<_, Option<i64>>(12)?.unwrap_or(0),
            created_at: row.get(13)?,
            created_at_epoch: row.get(14)?,
        })
    }

    fn row_to_summary(row: &Row) -> rusqlite::Result<SessionSummary> {
        Ok(SessionSummary {
            id: row.get(0)?,
            session_id: row.get(1)?,
            project: row.get(2)?,
            request: row.get(3)?,
            investigated: row.get(4)?,
            learned: row.get(5)?,
            completed: row.get(6)?,
            next_steps: row.get(7)?,
            notes: row.get(8)?,
            prompt_number: row.get(9)?,
            discovery_tokens: row.get::<_, Option<i64>>(10)?.unwrap_or(0),
            created_at: row.get(11)?,
            created_at_epoch: row.get(12)?,
        })
    }
}

/// JSON array column; malformed or missing values become an empty list
fn parse_list(raw: Option<String>, column: &str) -> Vec<String> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Vec::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!("malformed {} column, treating as empty: {}", column, e);
        Vec::new()
    })
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// `<alias>.project = ?` or `<alias>.project IN (...)`, pushing the bound values
fn project_clause(alias: &str, scope: &ProjectScope, params: &mut Vec<Value>) -> String {
    match scope {
        ProjectScope::Single(project) => {
            params.push(Value::Text(project.clone()));
            format!("{}.project = ?", alias)
        }
        ProjectScope::Multi(projects) => {
            params.extend(projects.iter().cloned().map(Value::Text));
            format!("{}.project IN ({})", alias, placeholders(projects.len()))
        }
    }
}

fn plan_clause(plan_path: Option<&str>, params: &mut Vec<Value>) -> &'static str {
    match plan_path {
        Some(plan) => {
            params.push(Value::Text(plan.to_string()));
            "AND (sp.plan_path IS NULL OR sp.plan_path = ?)"
        }
        None => "",
    }
}

fn limit_value(limit: usize) -> Value {
    Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX))
}

impl HistoryQuery for SqliteHistory {
    fn recent_observations(
        &self,
        scope: &ProjectScope,
        filter: ObservationFilter<'_>,
        plan_path: Option<&str>,
    ) -> HistoryResult<Vec<Observation>> {
        if scope.projects().is_empty() || filter.types.is_empty() || filter.concepts.is_empty() {
            return Ok(Vec::new());
        }

        let mut values = Vec::new();
        let project = project_clause("o", scope, &mut values);
        values.extend(filter.types.iter().cloned().map(Value::Text));
        values.extend(filter.concepts.iter().cloned().map(Value::Text));
        let plan = plan_clause(plan_path, &mut values);
        values.push(limit_value(filter.limit));

        let sql = format!(
            "SELECT {columns}
             FROM observations o
             LEFT JOIN sessions s ON o.session_id = s.session_id
             LEFT JOIN session_plans sp ON s.id = sp.session_db_id
             WHERE {project}
               AND o.type IN ({types})
               AND EXISTS (
                   SELECT 1 FROM json_each(o.concepts) WHERE value IN ({concepts})
               )
               {plan}
             ORDER BY o.created_at_epoch DESC, o.id DESC
             LIMIT ?",
            columns = OBSERVATION_COLUMNS,
            types = placeholders(filter.types.len()),
            concepts = placeholders(filter.concepts.len()),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), Self::row_to_observation)?;
        let observations = rows.collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("loaded {} observations for {:?}", observations.len(), scope);
        Ok(observations)
    }

    fn recent_summaries(
        &self,
        scope: &ProjectScope,
        limit: usize,
        plan_path: Option<&str>,
    ) -> HistoryResult<Vec<SessionSummary>> {
        if scope.projects().is_empty() {
            return Ok(Vec::new());
        }

        let mut values = Vec::new();
        let project = project_clause("ss", scope, &mut values);
        let plan = plan_clause(plan_path, &mut values);
        values.push(limit_value(limit));

        let sql = format!(
            "SELECT {columns}
             FROM session_summaries ss
             LEFT JOIN sessions s ON ss.session_id = s.session_id
             LEFT JOIN session_plans sp ON s.id = sp.session_db_id
             WHERE {project}
               {plan}
             ORDER BY ss.created_at_epoch DESC, ss.id DESC
             LIMIT ?",
            columns = SUMMARY_COLUMNS,
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), Self::row_to_summary)?;
        let summaries = rows.collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("loaded {} summaries for {:?}", summaries.len(), scope);
        Ok(summaries)
    }
}
