fn main() -> anyhow::Result<()> {
    entity_filter::run()
}
