use super::*;

#[tokio::test]
async fn serve_reports_an_already_running_server_without_spawning() {
    let dir = tempfile::tempdir().unwrap();
    foreman_store::WorkspaceStore::open(dir.path()).unwrap();
    let paths = crate::store_ctx::paths(dir.path());
    foreman_wire::DiscoveryRecord::new(std::process::id(), 4000, "http://127.0.0.1:4000").write(paths.server_discovery_file()).unwrap();

    run(dir.path(), ServeArgs { force: false }, OutputFormat::Text).await.unwrap();
}
