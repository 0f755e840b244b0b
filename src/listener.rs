//! Listener module driving the alarm from notification bus traffic.
//!
//! This module provides the [`Listener`] which runs the notification monitor
//! process and feeds its output through the parser and the alarm state machine.
//!
//! # Processing Flow
//!
//! ```text
//! dbus-monitor → BlockReader → NotificationParser → AlarmController → Alarm
//! ```
//!
//! # Lifecycle
//!
//! The listener runs until one of:
//!
//! - `Ctrl+C` is received
//! - the monitor output ends (the monitor process exited)
//! - reading the monitor output fails
//!
//! In every case the alarm is signalled to stop and the monitor process is
//! killed if it is still running. The monitor is never restarted.

use std::{future::Future, process::Stdio, sync::Arc};

use anyhow::Context;
use log::{debug, error, info, warn};
use tokio::{
    io::{AsyncBufRead, BufReader},
    process::Command,
};

use crate::{
    alarm::{Alarm, AlarmCommand, AlarmController, AlarmState, SoundPlayer, TargetSenders},
    config::{Config, Monitor},
    notification::{BlockReader, NotificationParser},
    utils::resolve_beside_executable,
};

/// Watches notifications and rings the alarm for the target senders.
///
/// # Examples
///
/// ```ignore
/// let config = Config::load()?;
/// let targets = TargetSenders::new(vec!["Alice".to_string()]);
/// let listener = Listener::new(&config, targets, CommandPlayer::new(&config.player));
/// listener.start().await?;
/// ```
pub struct Listener<P: SoundPlayer> {
    /// Monitor process to run
    monitor: Monitor,
    /// Decoder for monitor blocks
    parser: NotificationParser,
    /// Alarm state machine
    controller: AlarmController,
    /// Playback executor
    alarm: Alarm<P>,
}

impl<P: SoundPlayer + 'static> Listener<P> {
    /// Creates a listener from the configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Loaded configuration; `sound_file` is resolved next to the executable
    /// * `targets` - Senders that start and stop the alarm
    /// * `player` - Facility used to play the alarm sound
    pub fn new(config: &Config, targets: TargetSenders, player: P) -> Self {
        let sound = resolve_beside_executable(&config.sound_file);
        info!("alarm sound is {}", sound.display());

        Listener {
            monitor: config.monitor.clone(),
            parser: NotificationParser::new(&config.app_name),
            controller: AlarmController::new(targets, &config.stop_phrase),
            alarm: Alarm::new(Arc::new(player), sound),
        }
    }

    /// Starts the monitor process and processes its output until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the monitor cannot be spawned or its output cannot
    /// be read. The monitor is killed before returning in both cases.
    pub async fn start(mut self) -> anyhow::Result<()> {
        let mut child = Command::new(&self.monitor.program)
            .args(&self.monitor.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to start '{}'", self.monitor.program))?;

        let stdout = child
            .stdout
            .take()
            .context("monitor standard output was not captured")?;

        info!(
            "{} is running, waiting for notifications",
            self.monitor.program
        );

        let reader = BlockReader::new(BufReader::new(stdout));
        let result = self.run(reader, shutdown_signal()).await;

        self.alarm.shutdown();

        match child.try_wait() {
            Ok(Some(status)) => warn!("{} exited with {}", self.monitor.program, status),
            Ok(None) => {
                if let Err(e) = child.kill().await {
                    error!("failed to terminate {}: {}", self.monitor.program, e);
                } else {
                    info!("terminated the {} process", self.monitor.program);
                }
            }
            Err(e) => error!("failed to query {}: {}", self.monitor.program, e),
        }

        result
    }

    /// Processes blocks from `reader` until it ends or `shutdown` resolves.
    async fn run<R, F>(&mut self, mut reader: BlockReader<R>, shutdown: F) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("listener stopped by user");
                    self.alarm.shutdown();
                    return Ok(());
                }
                block = reader.next_block() => {
                    match block.context("failed to read monitor output")? {
                        Some(block) => {
                            self.handle_block(&block);
                        }
                        None => {
                            warn!("monitor output ended");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Handles one monitor block.
    ///
    /// Blocks that are not notifications from the watched application are
    /// skipped silently. Parsed notifications are printed, then evaluated by
    /// the state machine, and the resulting command is carried out.
    ///
    /// # Returns
    ///
    /// The state and command produced, or `None` if the block held no notification.
    fn handle_block(&mut self, block: &[String]) -> Option<(AlarmState, Option<AlarmCommand>)> {
        let record = self.parser.parse(block)?;
        println!("{record}");

        if !self.alarm.is_playing() {
            self.controller.playback_ended();
        }
        debug!(
            "alarm is {} before message from {}",
            self.controller.state(),
            record.sender
        );

        let (state, command) = self.controller.handle(&record);
        if let Some(command) = command {
            self.alarm.apply(command);
        }

        Some((state, command))
    }
}

/// Resolves when `Ctrl+C` is received.
///
/// If the handler cannot be installed the future never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use tempfile::NamedTempFile;
    use tokio::{
        io::AsyncWriteExt,
        time::{sleep, timeout},
    };

    use super::*;
    use crate::alarm::MockSoundPlayer;

    const BOUNDARY: &str = "method call time=1700000000.5 sender=:1.80 -> destination=:1.21 serial=9 path=/org/freedesktop/Notifications; interface=org.freedesktop.Notifications; member=Notify";

    fn notify_block(app: &str, sender: &str, body: &str) -> String {
        format!(
            "{BOUNDARY}\n   string \"{app}\"\n   uint32 0\n   string \"\"\n   string \"{sender}\"\n   string \"{body}\"\n   array [\n   ]\n   int32 -1\n"
        )
    }

    /// Joins blocks and appends a trailing boundary so the last one is flushed.
    fn stream(blocks: &[String]) -> String {
        let mut text = String::from("signal time=1 member=NameAcquired\n   string \":1.5\"\n");
        for block in blocks {
            text.push_str(block);
        }
        text.push_str("method call time=9 member=GetServerInformation\n");
        text
    }

    fn create_config(sound: &NamedTempFile) -> Config {
        Config {
            sound_file: sound.path().to_str().unwrap().to_string(),
            ..Config::default()
        }
    }

    fn create_listener(sound: &NamedTempFile, player: MockSoundPlayer) -> Listener<MockSoundPlayer> {
        let targets = TargetSenders::new(vec!["Alice".to_string()]);
        Listener::new(&create_config(sound), targets, player)
    }

    fn counting_player(calls: Arc<AtomicUsize>) -> MockSoundPlayer {
        let mut player = MockSoundPlayer::new();
        player.expect_play().returning(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(5));
            Ok(())
        });
        player
    }

    async fn run_stream(listener: &mut Listener<MockSoundPlayer>, text: &str) {
        let reader = BlockReader::new(BufReader::new(text.as_bytes()));
        listener
            .run(reader, std::future::pending())
            .await
            .unwrap();
    }

    async fn wait_for_calls(calls: &AtomicUsize, at_least: usize) {
        timeout(Duration::from_secs(5), async {
            while calls.load(Ordering::SeqCst) < at_least {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    async fn wait_until_silent(listener: &Listener<MockSoundPlayer>) {
        timeout(Duration::from_secs(5), async {
            while listener.alarm.is_playing() {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_target_message_starts_single_playback() {
        let sound = NamedTempFile::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut listener = create_listener(&sound, counting_player(Arc::clone(&calls)));

        let result = listener.handle_block(&lines(&notify_block("discord", "Alice", "urgent ping")));
        assert_eq!(
            result,
            Some((AlarmState::Ringing, Some(AlarmCommand::StartPlayback)))
        );
        assert!(listener.alarm.is_playing());

        let result = listener.handle_block(&lines(&notify_block("discord", "Alice", "hello?")));
        assert_eq!(result, Some((AlarmState::Ringing, None)));

        listener.alarm.shutdown();
        wait_until_silent(&listener).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stop_phrase_silences_ringing_alarm() {
        let sound = NamedTempFile::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut listener = create_listener(&sound, counting_player(Arc::clone(&calls)));

        listener.handle_block(&lines(&notify_block("discord", "Alice", "urgent ping")));
        let result = listener.handle_block(&lines(&notify_block(
            "discord",
            "Alice",
            "please stop the alarm now",
        )));

        assert_eq!(
            result,
            Some((AlarmState::Idle, Some(AlarmCommand::StopPlayback)))
        );
        wait_until_silent(&listener).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stop_phrase_while_idle_is_noop() {
        let sound = NamedTempFile::new().unwrap();
        let mut player = MockSoundPlayer::new();
        player.expect_play().times(0);
        let mut listener = create_listener(&sound, player);

        let result = listener.handle_block(&lines(&notify_block(
            "discord",
            "Alice",
            "please stop the alarm now",
        )));

        assert_eq!(result, Some((AlarmState::Idle, None)));
        assert!(!listener.alarm.is_playing());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_app_marker_produces_nothing() {
        let sound = NamedTempFile::new().unwrap();
        let mut player = MockSoundPlayer::new();
        player.expect_play().times(0);
        let mut listener = create_listener(&sound, player);

        let result = listener.handle_block(&lines(&notify_block("slack", "Alice", "urgent ping")));

        assert_eq!(result, None);
        assert_eq!(listener.controller.state(), AlarmState::Idle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_non_target_sender_is_ignored() {
        let sound = NamedTempFile::new().unwrap();
        let mut player = MockSoundPlayer::new();
        player.expect_play().times(0);
        let mut listener = create_listener(&sound, player);

        let result = listener.handle_block(&lines(&notify_block("discord", "Bob", "urgent ping")));

        assert_eq!(result, Some((AlarmState::Idle, None)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_playback_allows_next_alarm() {
        let sound = NamedTempFile::new().unwrap();
        let mut player = MockSoundPlayer::new();
        player
            .expect_play()
            .times(2)
            .returning(|_| Err(anyhow::anyhow!("no audio device")));
        let mut listener = create_listener(&sound, player);

        listener.handle_block(&lines(&notify_block("discord", "Alice", "ping")));
        wait_until_silent(&listener).await;

        let result = listener.handle_block(&lines(&notify_block("discord", "Alice", "ping again")));
        assert_eq!(
            result,
            Some((AlarmState::Ringing, Some(AlarmCommand::StartPlayback)))
        );
        wait_until_silent(&listener).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_processes_stream_end_to_end() {
        let sound = NamedTempFile::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut listener = create_listener(&sound, counting_player(Arc::clone(&calls)));

        let text = stream(&[
            notify_block("discord", "Bob", "hey"),
            notify_block("slack", "Alice", "urgent ping"),
            notify_block("discord", "Alice", "urgent ping"),
        ]);
        run_stream(&mut listener, &text).await;

        assert_eq!(listener.controller.state(), AlarmState::Ringing);
        assert!(listener.alarm.is_playing());
        wait_for_calls(&calls, 1).await;

        let text = stream(&[notify_block("discord", "Alice", "OK, Stop The Alarm")]);
        run_stream(&mut listener, &text).await;

        assert_eq!(listener.controller.state(), AlarmState::Idle);
        wait_until_silent(&listener).await;
        assert!(calls.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_drops_unterminated_last_block() {
        let sound = NamedTempFile::new().unwrap();
        let mut player = MockSoundPlayer::new();
        player.expect_play().times(0);
        let mut listener = create_listener(&sound, player);

        run_stream(&mut listener, &notify_block("discord", "Alice", "urgent ping")).await;

        assert_eq!(listener.controller.state(), AlarmState::Idle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_run_returns_on_shutdown() {
        let sound = NamedTempFile::new().unwrap();
        let mut player = MockSoundPlayer::new();
        player.expect_play().times(0);
        let mut listener = create_listener(&sound, player);

        let (_writer, read_half) = tokio::io::duplex(64);
        let reader = BlockReader::new(BufReader::new(read_half));

        let result = timeout(
            Duration::from_secs(5),
            listener.run(reader, sleep(Duration::from_millis(20))),
        )
        .await
        .unwrap();

        assert!(result.is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_shutdown_while_ringing_stops_playback() {
        let sound = NamedTempFile::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut listener = create_listener(&sound, counting_player(Arc::clone(&calls)));

        let (mut writer, read_half) = tokio::io::duplex(4096);
        let text = stream(&[notify_block("discord", "Alice", "urgent ping")]);
        writer.write_all(text.as_bytes()).await.unwrap();
        let reader = BlockReader::new(BufReader::new(read_half));

        // Interrupt once the alarm has rung at least once
        let interrupt = {
            let calls = Arc::clone(&calls);
            async move { wait_for_calls(&calls, 1).await }
        };

        let result = timeout(Duration::from_secs(5), listener.run(reader, interrupt))
            .await
            .unwrap();

        assert!(result.is_ok());
        assert_eq!(listener.controller.state(), AlarmState::Ringing);
        wait_until_silent(&listener).await;
        assert!(!listener.alarm.is_playing());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_start_with_missing_monitor_fails() {
        let sound = NamedTempFile::new().unwrap();
        let config = Config {
            monitor: Monitor {
                program: "buzzer-no-such-monitor".to_string(),
                args: vec![],
            },
            ..create_config(&sound)
        };
        let listener = Listener::new(
            &config,
            TargetSenders::new(vec!["Alice".to_string()]),
            MockSoundPlayer::new(),
        );

        let err = listener.start().await.unwrap_err();
        assert!(err.to_string().contains("failed to start 'buzzer-no-such-monitor'"));
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "multi_thread")]
    async fn test_start_reads_monitor_output_until_exit() {
        let sound = NamedTempFile::new().unwrap();
        let text = stream(&[notify_block("discord", "Bob", "hello")]);
        let config = Config {
            monitor: Monitor {
                program: "printf".to_string(),
                args: vec!["%s".to_string(), text],
            },
            ..create_config(&sound)
        };
        let mut player = MockSoundPlayer::new();
        player.expect_play().times(0);
        let listener = Listener::new(
            &config,
            TargetSenders::new(vec!["Alice".to_string()]),
            player,
        );

        let result = timeout(Duration::from_secs(5), listener.start()).await.unwrap();
        assert!(result.is_ok());
    }

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }
}
