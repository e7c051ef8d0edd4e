use anyhow::Result;

fn main() -> Result<()> {
    modpicker::cli::run()
}
