use epibind::engine::progress::{Progress, ProgressCallback};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::debug;

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

pub struct UiManager {
    mp: Arc<MultiProgress>,
    state: BarState,
    event_receiver: mpsc::Receiver<UiEvent>,
    shutdown_receiver: watch::Receiver<bool>,
    _sentinel_bar: ProgressBar,
}

#[derive(Default)]
struct BarState {
    active_bar: Option<ProgressBar>,
    base_message: String,
}

impl BarState {
    fn clear(&mut self) {
        if let Some(bar) = self.active_bar.take() {
            bar.finish_and_clear();
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Some(bar) = &self.active_bar {
            f(bar);
        }
    }
}

impl UiManager {
    pub fn new(quiet: bool) -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, event_receiver) = mpsc::channel(1024);
        let (shutdown_sender, shutdown_receiver) = watch::channel(false);
        let target = if quiet {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr_with_hz(12)
        };
        let mp = Arc::new(MultiProgress::with_draw_target(target));
        let _sentinel_bar = mp.add(ProgressBar::hidden());
        let manager = Self {
            mp,
            state: BarState::default(),
            event_receiver,
            shutdown_receiver,
            _sentinel_bar,
        };

        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.event_receiver.recv() => self.handle_event(event),
                changed = self.shutdown_receiver.changed() => {
                    if changed.is_err() || *self.shutdown_receiver.borrow() {
                        break;
                    }
                }
            }
        }
        // Drain whatever was queued before shutdown was signalled.
        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event);
        }
        self.state.clear();
        self._sentinel_bar.finish_and_clear();
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(line) => self.print(line),
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn print(&self, line: impl AsRef<str>) {
        let _ = self.mp.println(line);
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::PhaseStart { name } => self.begin_phase(name),
            Progress::PhaseFinish => {
                self.state.clear();
                let phase = std::mem::take(&mut self.state.base_message);
                self.print(format!("✓ {}", phase));
            }
            Progress::TaskStart { total } => self.state.with_bar(|bar| {
                bar.disable_steady_tick();
                bar.set_style(Self::bar_style());
                bar.set_length(total);
                bar.reset();
            }),
            Progress::TaskIncrement { amount } => self.state.with_bar(|bar| bar.inc(amount)),
            Progress::TaskFinish => self.state.with_bar(ProgressBar::finish),
            Progress::StatusUpdate { text } => {
                let message = format!("{} ({})", self.state.base_message, text);
                self.state.with_bar(|bar| bar.set_message(message));
            }
        }
    }

    fn begin_phase(&mut self, name: &'static str) {
        self.state.clear();

        let spinner = self.mp.add(ProgressBar::new_spinner());
        spinner.set_style(Self::spinner_style());
        spinner.set_message(name);
        spinner.enable_steady_tick(Duration::from_millis(80));

        self.state.active_bar = Some(spinner);
        self.state.base_message = name.to_string();
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{msg:<40} [{bar:40.cyan/blue}] {pos}/{len} records ({elapsed_secs})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key(
            "elapsed_secs",
            |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                let _ = write!(w, "{:.0}s", state.elapsed().as_secs_f64());
            },
        )
        .progress_chars("━╸ ")
    }
}

#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                debug!("Dropped progress update for the UI: {}", e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn setup_manager() -> (UiManager, mpsc::Sender<UiEvent>) {
        let (manager, sender, _shutdown) = UiManager::new(true);
        (manager, sender)
    }

    fn start_phase(manager: &mut UiManager) {
        manager.handle_event(UiEvent::Progress(Progress::PhaseStart {
            name: "Predicting binders",
        }));
    }

    #[test]
    fn handle_phase_start_creates_new_spinner() {
        let (mut manager, _) = setup_manager();
        assert!(manager.state.active_bar.is_none());

        start_phase(&mut manager);

        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "Predicting binders");
        assert_eq!(manager.state.base_message, "Predicting binders");
    }

    #[test]
    fn handle_phase_start_replaces_existing_bar() {
        let (mut manager, _) = setup_manager();
        start_phase(&mut manager);

        manager.handle_event(UiEvent::Progress(Progress::PhaseStart {
            name: "Second Phase",
        }));

        let second_bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(second_bar.message(), "Second Phase");
        assert_eq!(manager.state.base_message, "Second Phase");
    }

    #[test]
    fn handle_phase_finish_clears_active_bar() {
        let (mut manager, _) = setup_manager();
        start_phase(&mut manager);

        manager.handle_event(UiEvent::Progress(Progress::PhaseFinish));

        assert!(manager.state.active_bar.is_none());
        assert!(manager.state.base_message.is_empty());
    }

    #[test]
    fn task_events_drive_the_bar() {
        let (mut manager, _) = setup_manager();
        start_phase(&mut manager);

        manager.handle_event(UiEvent::Progress(Progress::TaskStart { total: 10 }));
        {
            let bar = manager.state.active_bar.as_ref().unwrap();
            assert_eq!(bar.length(), Some(10));
            assert_eq!(bar.position(), 0);
        }

        for _ in 0..3 {
            manager.handle_event(UiEvent::Progress(Progress::TaskIncrement { amount: 1 }));
        }
        assert_eq!(manager.state.active_bar.as_ref().unwrap().position(), 3);

        manager.handle_event(UiEvent::Progress(Progress::TaskFinish));
        assert!(manager.state.active_bar.as_ref().unwrap().is_finished());
    }

    #[test]
    fn handle_status_update_changes_bar_message() {
        let (mut manager, _) = setup_manager();
        start_phase(&mut manager);

        manager.handle_event(UiEvent::Progress(Progress::StatusUpdate {
            text: "2 failed".into(),
        }));

        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "Predicting binders (2 failed)");
    }

    #[test]
    fn events_without_an_active_bar_are_ignored() {
        let (mut manager, _) = setup_manager();
        manager.handle_event(UiEvent::Progress(Progress::TaskIncrement { amount: 1 }));
        manager.handle_event(UiEvent::Progress(Progress::TaskFinish));
        manager.handle_event(UiEvent::Log("a log line".to_string()));
        assert!(manager.state.active_bar.is_none());
    }

    #[tokio::test]
    async fn cli_progress_handler_sends_progress_event() {
        let (sender, mut receiver) = mpsc::channel(1);
        let handler = CliProgressHandler::new(sender);
        let callback = handler.get_callback();

        callback(Progress::TaskStart { total: 5 });

        match receiver.recv().await.unwrap() {
            UiEvent::Progress(Progress::TaskStart { total }) => assert_eq!(total, 5),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn run_drains_queued_events_before_exit() {
        let (manager, sender, shutdown) = UiManager::new(true);
        let handle = tokio::spawn(manager.run());

        sender
            .send(UiEvent::Progress(Progress::PhaseStart { name: "Phase" }))
            .await
            .unwrap();
        sender
            .send(UiEvent::Progress(Progress::PhaseFinish))
            .await
            .unwrap();
        shutdown.send(true).unwrap();

        handle.await.unwrap();
    }
}
