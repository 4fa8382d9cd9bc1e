use air_canvas::{app, config::Config};
use anyhow::Context;

#[air_canvas::main]
fn main() -> anyhow::Result<()> {
    let config = Config::from_env().with_context(|| app::requirements_hint(None))?;
    app::run(&config).with_context(|| app::requirements_hint(Some(&config)))
}
