use clap::Parser;
use kroma_bindings_gen::{generate, Options};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let opt = Options::parse();
    generate(&opt)
}
