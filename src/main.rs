use {
    anyhow::Result,
    clap::Parser,
    ddpg_agent::cli::{
        run,
        Args,
    },
};


fn main() -> Result<()> {
    run(Args::parse())
}
