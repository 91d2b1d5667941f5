use clap::Parser;

#[derive(Debug, Parser)]
pub struct Args {
    /// Window width in pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,
    /// Window height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,
}
