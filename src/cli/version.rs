/// Display version information
pub fn execute() {
    println!("council {}", env!("CARGO_PKG_VERSION"));
    println!("Multi-controller governance engine");
    println!("Snapshot schema version {}", council::governance::SCHEMA_VERSION);
}
