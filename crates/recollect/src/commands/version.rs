pub fn run() -> anyhow::Result<()> {
    println!("recollect {}", env!("CARGO_PKG_VERSION"));
    println!("Session-start context from past coding sessions");
    Ok(())
}
