fn main() -> anyhow::Result<()> {
    loadstat::run()
}
