fn main() -> anyhow::Result<()> {
    todolist_api::cli::run_cli()
}
