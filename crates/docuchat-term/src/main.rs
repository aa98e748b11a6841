use anyhow::bail;
use anyhow::Result;
use docuchat_term::application::cli;
use docuchat_term::application::cli::CliOutcome;
use docuchat_term::application::ui;
use docuchat_term::destruct_terminal_for_panic;
use docuchat_term::domain::models::Action;
use docuchat_term::domain::models::Event;
use docuchat_term::domain::models::ThemeMode;
use docuchat_term::domain::services::ActionsService;
use docuchat_term::domain::services::InitOutcome;
use docuchat_term::BackendClientManager;
use docuchat_term::Config;
use docuchat_term::ConfigKey;
use docuchat_term::Session;
use docuchat_term::SessionProps;
use tokio::sync::mpsc;

fn handle_panic(info: &std::panic::PanicInfo) {
    destruct_terminal_for_panic();
    better_panic::Settings::auto()
        .most_recent_first(false)
        .lineno_suffix(true)
        .create_panic_handler()(info);
}

#[tokio::main]
async fn main() -> Result<()> {
    std::panic::set_hook(Box::new(handle_panic));

    if cli::parse().await? == CliOutcome::Exit {
        return Ok(());
    }

    let backend = BackendClientManager::get()?;
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let theme = Config::get(ConfigKey::Theme)
        .parse::<ThemeMode>()
        .unwrap_or_default();
    let mut session = Session::new(SessionProps {
        action_tx,
        dark_mode: theme == ThemeMode::Dark,
        recording_window: Config::get_millis(ConfigKey::RecordingWindow)?,
    });

    if session.initialize(&Config::get(ConfigKey::DocumentId))? == InitOutcome::Redirect {
        let reason = session
            .messages()
            .first()
            .map(|message| return message.content.to_string())
            .unwrap_or_default();
        bail!(reason);
    }

    let worker = tokio::spawn(async move {
        if let Err(err) = ActionsService::start(backend, event_tx, &mut action_rx).await {
            tracing::error!(error = ?err, "actions worker stopped");
        }
    });

    let res = ui::run(&mut session, event_rx).await;
    worker.abort();
    tracing::info!("session closed");

    return res;
}
