use anyhow::Context;

fn main() -> anyhow::Result<()> {
    cartographer::run().context("cartographer failed")
}
