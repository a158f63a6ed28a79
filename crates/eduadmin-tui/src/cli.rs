//! Command-line interface and the non-interactive commands.
//!
//! Without a subcommand the binary starts the terminal UI. Subcommands manage
//! the saved session and run one-shot jobs against the API.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, info, warn};

use eduadmin_core::api::{ApiClient, TestsQuery};
use eduadmin_core::auth::{Session, SessionData};
use eduadmin_core::config::Config;
use eduadmin_core::store::{CollectionKey, Store, TeacherFilter};

/// Maximum concurrent page requests when exporting.
const MAX_CONCURRENT_REQUESTS: usize = 4;

#[derive(Debug, Parser)]
#[command(name = "eduadmin", version, about = "Terminal admin client for the education platform")]
pub struct Cli {
    /// API base URL (overrides config and EDUADMIN_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Location to open the UI at, e.g. "/tests?page=2&teacherId=all"
    #[arg(long)]
    pub open: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save a session token for later runs
    Login {
        #[arg(long)]
        token: String,
        /// Id of the signed-in user (defaults to the last one used)
        #[arg(long)]
        user_id: Option<String>,
    },
    /// Forget the saved session
    Logout,
    /// Print every page of the tests list as a JSON array
    ExportTests {
        /// Teacher id to filter by ("all" for everyone)
        #[arg(long, conflicts_with = "own")]
        teacher: Option<String>,
        /// Export the signed-in teacher's own tests
        #[arg(long)]
        own: bool,
    },
    /// Upload a new avatar for the signed-in user
    Avatar { file: PathBuf },
}

/// Services shared by the one-shot commands.
struct CommandContext {
    config: Config,
    session: Session,
}

impl CommandContext {
    fn load(base_url: Option<String>) -> Result<Self> {
        let mut config = Config::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        });
        if let Some(url) = base_url {
            config.base_url = url;
        }
        let mut session = Session::new(config.cache_dir()?);
        session.load()?;
        Ok(Self { config, session })
    }

    fn api(&self) -> Result<ApiClient> {
        let token = self
            .session
            .token()
            .context("Not signed in. Run `eduadmin login --token <token> --user-id <id>` first.")?;
        let api = ApiClient::new(self.config.base_url.clone(), self.config.request_timeout())?;
        Ok(api.with_token(token.to_string()))
    }
}

pub async fn run(command: Command, base_url: Option<String>) -> Result<()> {
    let mut ctx = CommandContext::load(base_url)?;
    match command {
        Command::Login { token, user_id } => {
            let user_id = login(&mut ctx, token, user_id)?;
            ctx.config.last_user_id = Some(user_id);
            if let Err(e) = ctx.config.save() {
                warn!(error = %e, "Failed to save config");
            }
            Ok(())
        }
        Command::Logout => {
            ctx.session.clear()?;
            eprintln!("Signed out.");
            Ok(())
        }
        Command::ExportTests { teacher, own } => {
            let filter = if own {
                None
            } else {
                Some(TeacherFilter::from_param(teacher.as_deref()))
            };
            let items = export_tests(&ctx.api()?, ctx.config.page_size, filter).await?;
            println!("{}", serde_json::to_string_pretty(&items)?);
            eprintln!("Exported {} tests.", items.len());
            Ok(())
        }
        Command::Avatar { file } => upload_avatar(&ctx.api()?, &file, &ctx.config).await,
    }
}

/// Save the session, returning the user id it was saved for.
fn login(ctx: &mut CommandContext, token: String, user_id: Option<String>) -> Result<String> {
    let user_id = user_id
        .or_else(|| ctx.config.last_user_id.clone())
        .context("No user id given and none remembered. Pass --user-id <id>.")?;
    if token.trim().is_empty() || user_id.trim().is_empty() {
        bail!("Token and user id must not be empty");
    }
    ctx.session.update(SessionData::new(token, user_id.clone()));
    ctx.session.save().context("Failed to save session")?;

    info!(user_id = %user_id, "Session saved");
    eprintln!("Signed in as {}.", user_id);
    Ok(user_id)
}

/// Fetch every page of a tests list into a store, returning the items in page order.
///
/// `filter == None` exports the signed-in teacher's own tests. Page 1 is
/// fetched first to learn the page count; the rest are fetched concurrently.
pub async fn export_tests(api: &ApiClient, limit: u32, filter: Option<TeacherFilter>) -> Result<Vec<Value>> {
    let key = match filter {
        Some(ref f) => CollectionKey::Tests(f.clone()),
        None => CollectionKey::OwnTests,
    };
    let query = |page: u32| TestsQuery {
        page,
        limit,
        teacher_id: filter.as_ref().map(|f| f.as_param().to_string()),
    };

    let mut store = Store::new();
    store.collections_mut().initialize(&key, true);

    let ticket = store
        .begin_page_fetch(&key, 1, false)?
        .context("Page 1 already in flight")?;
    let first = api.fetch_tests(&query(1)).await?;
    store.complete_page(&ticket, first.items, first.pagination.as_ref())?;

    let total_pages = store
        .collections()
        .get_metadata(&key)
        .map(|m| m.total_pages)
        .unwrap_or(1)
        .max(1);
    debug!(%key, total_pages, "Exporting tests");

    let mut tickets = Vec::new();
    for page in 2..=total_pages {
        if let Some(ticket) = store.begin_page_fetch(&key, page, false)? {
            tickets.push((page, ticket));
        }
    }

    let results: Vec<_> = stream::iter(tickets)
        .map(|(page, ticket)| {
            let q = query(page);
            async move { (ticket, api.fetch_tests(&q).await) }
        })
        .buffer_unordered(MAX_CONCURRENT_REQUESTS)
        .collect()
        .await;

    for (ticket, result) in results {
        let page = result.with_context(|| format!("Failed to fetch {:?}", ticket.target()))?;
        store.complete_page(&ticket, page.items, page.pagination.as_ref())?;
    }

    let items = (1..=total_pages)
        .filter_map(|p| store.collections().get_page_data(&key, p))
        .flat_map(|p| p.items().iter().cloned())
        .collect();
    Ok(items)
}

async fn upload_avatar(api: &ApiClient, file: &Path, config: &Config) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("avatar")
        .to_string();

    match api.update_avatar(bytes, &file_name).await {
        Ok(result) => {
            eprintln!("{}", result.message.unwrap_or_else(|| "Avatar updated.".to_string()));
            Ok(())
        }
        Err(e) => bail!(e.user_message(&config.generic_error_message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_export_tests() {
        let cli = Cli::parse_from(["eduadmin", "--base-url", "http://x", "export-tests", "--teacher", "t1"]);
        assert_eq!(cli.base_url.as_deref(), Some("http://x"));
        match cli.command {
            Some(Command::ExportTests { teacher, own }) => {
                assert_eq!(teacher.as_deref(), Some("t1"));
                assert!(!own);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_export_own_conflicts_with_teacher() {
        assert!(Cli::try_parse_from(["eduadmin", "export-tests", "--own", "--teacher", "t1"]).is_err());
    }

    #[tokio::test]
    async fn test_export_tests_collects_all_pages_in_order() {
        use serde_json::json;
        use std::time::Duration;
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        for page in 1..=3u32 {
            Mock::given(method("GET"))
                .and(path("/api/tests"))
                .and(query_param("page", page.to_string()))
                .and(query_param("teacherId", "t1"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "code": "testsFetched",
                    "tests": [{"_id": format!("p{}", page)}],
                    "pagination": {"total": 3, "totalPages": 3, "hasNextPage": page < 3, "hasPrevPage": page > 1}
                })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let api = ApiClient::new(server.uri(), Duration::from_secs(5))
            .unwrap()
            .with_token("t".into());
        let items = export_tests(&api, 1, Some(TeacherFilter::Teacher("t1".into())))
            .await
            .unwrap();

        let ids: Vec<&str> = items.iter().filter_map(|i| i["_id"].as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_export_tests_without_total_pages_keeps_first_page() {
        use serde_json::json;
        use std::time::Duration;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "testsFetched",
                "tests": [{"_id": "a"}, {"_id": "b"}],
                "pagination": {"total": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri(), Duration::from_secs(5))
            .unwrap()
            .with_token("t".into());
        let items = export_tests(&api, 12, Some(TeacherFilter::All)).await.unwrap();

        let ids: Vec<&str> = items.iter().filter_map(|i| i["_id"].as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_login_user_id_is_optional() {
        let cli = Cli::parse_from(["eduadmin", "login", "--token", "abc"]);
        match cli.command {
            Some(Command::Login { token, user_id }) => {
                assert_eq!(token, "abc");
                assert_eq!(user_id, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_login_falls_back_to_last_user_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = CommandContext {
            config: Config {
                last_user_id: Some("u7".into()),
                ..Config::default()
            },
            session: Session::new(dir.path().to_path_buf()),
        };

        assert_eq!(login(&mut ctx, "tok".into(), None).unwrap(), "u7");
        assert_eq!(ctx.session.user_id(), Some("u7"));

        let mut fresh = CommandContext {
            config: Config::default(),
            session: Session::new(dir.path().to_path_buf()),
        };
        assert!(login(&mut fresh, "tok".into(), None).is_err());
    }

    #[test]
    fn test_parse_open_without_subcommand() {
        let cli = Cli::parse_from(["eduadmin", "--open", "/users?role=admin"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.open.as_deref(), Some("/users?role=admin"));
    }
}
