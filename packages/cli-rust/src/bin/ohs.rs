//! ohs - Short alias for openhands-space

fn main() -> anyhow::Result<()> {
    openhands_space::run()
}
