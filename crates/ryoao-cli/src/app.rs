//! Component wiring for one CLI invocation.

use std::path::PathBuf;
use std::sync::Arc;

use ryoao_application::{AnalysisService, ConversationThread, ReportRenderer, SessionStore};
use ryoao_core::notice::Notice;
use ryoao_core::session::{ModeSignal, Session};
use ryoao_core::{Result, RyoaoError};
use ryoao_infrastructure::{AppConfig, ConfigService, FileTokenStore, RyoaoPaths, fixture_source};
use ryoao_interaction::HttpBackend;

pub struct App {
    pub config: AppConfig,
    pub session: Arc<SessionStore>,
    pub analysis: Arc<AnalysisService>,
    pub thread: Arc<ConversationThread>,
    pub renderer: ReportRenderer,
}

impl App {
    pub fn build(paths: RyoaoPaths) -> Result<Self> {
        let config = ConfigService::new(&paths)?.load_with_env()?;

        let backend = Arc::new(
            HttpBackend::with_timeout(config.api_base_url.clone(), config.request_timeout())
                .map_err(|e| RyoaoError::config(e.to_string()))?,
        );
        let tokens = Arc::new(FileTokenStore::new(&paths)?);

        let session = Arc::new(SessionStore::new(backend.clone(), tokens));
        let analysis = AnalysisService::new(
            session.clone(),
            backend,
            fixture_source(config.fixture_path.clone()),
            config.dummy_latency(),
        );
        let thread = ConversationThread::new(&session, analysis.clone());
        let renderer = ReportRenderer::with_rows_per_page(config.rows_per_page);

        Ok(Self {
            config,
            session,
            analysis,
            thread,
            renderer,
        })
    }

    /// Startup checkpoint: restores the stored session or enters dummy mode.
    pub fn start(&self, signal: &ModeSignal) -> Result<Option<Notice>> {
        let notice = match self.session.resume_from_storage(signal)? {
            Some(Session::Dummy) => Some(dummy_notice()),
            Some(Session::Live { .. }) => {
                Some(Notice::info("Welcome back", "Resumed your previous session."))
            }
            _ => None,
        };
        Ok(notice)
    }

    /// `--out`, else the configured directory, else the working directory.
    pub fn report_dir(&self, out: Option<PathBuf>) -> PathBuf {
        out.or_else(|| self.config.report_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn dummy_notice() -> Notice {
    Notice::warning(
        "Dummy mode",
        "Showing sample data. Nothing is sent to the server.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ryoao_core::notice::NoticeLevel;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> App {
        App::build(RyoaoPaths::new(Some(dir.path()))).unwrap()
    }

    #[test]
    fn test_start_without_stored_session_is_silent() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        assert_eq!(app.start(&ModeSignal::none()).unwrap(), None);
        assert_eq!(app.session.current(), Session::LoggedOut);
    }

    #[test]
    fn test_start_with_dummy_signal_announces_dummy_mode() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let notice = app.start(&ModeSignal::dummy()).unwrap().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice, dummy_notice());
        assert_eq!(app.session.current(), Session::Dummy);
    }

    #[test]
    fn test_report_dir_prefers_explicit_out() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        assert_eq!(app.report_dir(None), PathBuf::from("."));
        assert_eq!(
            app.report_dir(Some(PathBuf::from("reports"))),
            PathBuf::from("reports")
        );
    }
}
