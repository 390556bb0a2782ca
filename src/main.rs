use releasedeck::cli::run;

fn main() -> anyhow::Result<()> {
    run()
}
