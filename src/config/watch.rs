use super::app;
use crate::ErrorBox;
use inotify::{Inotify, WatchMask};
use smol::channel::Sender;
use std::path::PathBuf;

/// Re-reads the config file whenever it is rewritten and forwards changed
/// pipeline settings. Blocks, so it runs on its own thread.
pub struct Watcher {
    path: PathBuf,
    settings_tx: Sender<app::Pipeline>,
    current: app::Pipeline,
}

impl Watcher {
    pub fn new(path: PathBuf, settings_tx: Sender<app::Pipeline>, current: app::Pipeline) -> Self {
        Self {
            path,
            settings_tx,
            current,
        }
    }

    pub fn run(&mut self) -> Result<(), ErrorBox> {
        let dir = self
            .path
            .parent()
            .ok_or("Config file has no parent directory")?;
        let file_name = self
            .path
            .file_name()
            .ok_or("Config path has no file name")?
            .to_owned();

        let mut inotify = Inotify::init()?;
        // Editors often replace the file instead of writing to it, so watch the directory
        inotify
            .watches()
            .add(dir, WatchMask::CLOSE_WRITE | WatchMask::MOVED_TO)?;

        let mut buffer = [0; 4096];
        loop {
            let changed = inotify
                .read_events_blocking(&mut buffer)?
                .any(|event| event.name == Some(file_name.as_os_str()));

            if changed {
                self.reload();
            }
        }
    }

    fn reload(&mut self) {
        let pipeline = match super::read(&self.path, &self.current) {
            Ok(config) => config.pipeline,
            Err(err) => {
                log::error!("Keeping previous settings: {err:#}");
                return;
            }
        };

        if pipeline == self.current {
            return;
        }

        log::info!("Reloaded {}", self.path.display());
        log::debug!("Using {pipeline:#?}");
        self.current = pipeline.clone();
        self.settings_tx
            .send_blocking(pipeline)
            .expect("Unable to send reloaded settings, channel is dead");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smol::channel;
    use std::fs;

    fn setup(content: &str) -> Result<(Watcher, channel::Receiver<app::Pipeline>, PathBuf), ErrorBox> {
        let dir = std::env::temp_dir().join(format!(
            "rangewatch-watch-{}-{}",
            std::process::id(),
            content.len()
        ));
        fs::create_dir_all(&dir)?;
        let path = dir.join("config.toml");
        fs::write(&path, content)?;

        let (settings_tx, settings_rx) = channel::bounded(4);
        let watcher = Watcher::new(path.clone(), settings_tx, app::Pipeline::default());
        Ok((watcher, settings_rx, path))
    }

    #[test]
    fn test_reload_sends_changed_settings() -> Result<(), ErrorBox> {
        let (mut watcher, settings_rx, path) =
            setup("source = \"stdin\"\n[pipeline]\nalgorithm = \"kalman\"\n")?;

        watcher.reload();

        assert_eq!("kalman", settings_rx.try_recv()?.algorithm);
        assert_eq!("kalman", watcher.current.algorithm);
        fs::remove_file(path)?;
        Ok(())
    }

    #[test]
    fn test_reload_skips_unchanged_and_invalid_files() -> Result<(), ErrorBox> {
        let (mut watcher, settings_rx, path) = setup("source = \"stdin\"\n")?;

        watcher.reload();
        assert!(settings_rx.try_recv().is_err());

        fs::write(&path, "this is not toml ==")?;
        watcher.reload();
        assert!(settings_rx.try_recv().is_err());
        assert_eq!(app::Pipeline::default(), watcher.current);

        fs::remove_file(path)?;
        Ok(())
    }
}
