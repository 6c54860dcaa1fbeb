//! openhands-space - Provision and package the OpenHands backend for Hugging Face Spaces

fn main() -> anyhow::Result<()> {
    openhands_space::run()
}
