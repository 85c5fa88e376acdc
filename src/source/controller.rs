use super::{parse_record, Clock, MAX_RECORD_LEN};
use crate::config::app::Source;
use crate::sample::Sample;
use crate::ErrorBox;
use smol::channel::Sender;
use smol::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use smol::process::{Child, Command, Stdio};
use smol::Timer;
use std::time::Duration;

const RESTART_DELAY_MS: u64 = 2000;

type Reader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Reads records from the configured source and forwards them as samples.
pub struct Controller<C: Clock> {
    source: Source,
    sample_tx: Sender<Sample>,
    reset_tx: Sender<()>,
    clock: C,
}

impl<C: Clock> Controller<C> {
    pub fn new(source: Source, sample_tx: Sender<Sample>, reset_tx: Sender<()>, clock: C) -> Self {
        Self {
            source,
            sample_tx,
            reset_tx,
            clock,
        }
    }

    pub async fn run(&mut self) {
        if let Source::None = self.source {
            log::info!("No input source configured");
            return;
        }

        loop {
            match self.open().await {
                Ok((reader, _child)) => match self.consume(reader).await {
                    Ok(count) => log::info!("Input stream ended after {count} samples"),
                    Err(err) => log::error!("Unable to read input: {err}"),
                },
                Err(err) => log::error!("Unable to open input: {err}"),
            }

            if !self.reopens().await {
                log::info!("Input source is exhausted, not reopening it");
                return;
            }

            Timer::after(Duration::from_millis(RESTART_DELAY_MS)).await;

            // the next stream is not continuous with the previous one
            self.reset_tx
                .send(())
                .await
                .expect("Unable to send reset request, channel is dead");
        }
    }

    /// Only streams that can produce more data after EOF are reopened. A missing
    /// path is retried since devices may come back.
    async fn reopens(&self) -> bool {
        match &self.source {
            Source::Stdin | Source::None => false,
            Source::File { path } => smol::fs::metadata(path)
                .await
                .map_or(true, |metadata| !metadata.is_file()),
            Source::Cmd { .. } => true,
        }
    }

    async fn open(&self) -> Result<(Reader, Option<Child>), ErrorBox> {
        match &self.source {
            Source::Stdin => Ok((
                Box::new(BufReader::new(smol::Unblock::new(std::io::stdin()))) as Reader,
                None,
            )),
            Source::File { path } => Ok((
                Box::new(BufReader::new(smol::fs::File::open(path).await?)) as Reader,
                None,
            )),
            Source::Cmd { command } => {
                let mut child = Command::new("sh")
                    .arg("-c")
                    .arg(command)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .kill_on_drop(true)
                    .spawn()?;
                let stdout = child
                    .stdout
                    .take()
                    .ok_or_else(|| format!("Command {command:?} has no stdout"))?;
                Ok((Box::new(BufReader::new(stdout)) as Reader, Some(child)))
            }
            Source::None => Err("No input source configured".into()),
        }
    }

    /// Forwards every valid record until the stream ends, returning how many were sent.
    pub async fn consume(&mut self, mut reader: impl AsyncBufRead + Unpin) -> Result<u64, ErrorBox> {
        let mut line = Vec::with_capacity(MAX_RECORD_LEN + 1);
        let mut count = 0;

        while read_record(&mut reader, &mut line).await? > 0 {
            match parse_record(&line, self.clock.now_ms()) {
                Ok(Some(sample)) => {
                    self.sample_tx
                        .send(sample)
                        .await
                        .expect("Unable to send new sample, channel is dead");
                    count += 1;
                }
                Ok(None) => {}
                Err(err) => log::warn!("Dropping record: {err}"),
            }
        }

        Ok(count)
    }
}

/// Reads one line into `line` without the terminator, keeping at most one byte
/// more than [`MAX_RECORD_LEN`] so oversized records are detectable but never
/// buffered whole. Returns the number of bytes consumed, 0 at the end of the stream.
async fn read_record(
    reader: &mut (impl AsyncBufRead + Unpin),
    line: &mut Vec<u8>,
) -> std::io::Result<usize> {
    line.clear();
    let mut consumed = 0;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(consumed);
        }

        let newline = available.iter().position(|&b| b == b'\n');
        let chunk = &available[..newline.unwrap_or(available.len())];
        let room = (MAX_RECORD_LEN + 1).saturating_sub(line.len());
        line.extend_from_slice(&chunk[..chunk.len().min(room)]);

        let used = chunk.len() + newline.map_or(0, |_| 1);
        reader.consume(used);
        consumed += used;

        if newline.is_some() {
            return Ok(consumed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel_ext::ReceiverExt;
    use crate::source::MockClock;
    use macro_rules_attribute::apply;
    use smol::channel::{self, Receiver};
    use smol_macros::test;

    fn setup(source: Source) -> (Controller<MockClock>, Receiver<Sample>, Receiver<()>) {
        let (sample_tx, sample_rx) = channel::bounded(128);
        let (reset_tx, reset_rx) = channel::bounded(128);
        let mut clock = MockClock::new();
        let mut now = 1_000;
        clock.expect_now_ms().returning(move || {
            now += 10;
            now
        });
        let controller = Controller::new(source, sample_tx, reset_tx, clock);
        (controller, sample_rx, reset_rx)
    }

    #[apply(test!)]
    async fn test_consume_forwards_valid_records() -> Result<(), ErrorBox> {
        let (mut controller, sample_rx, _) = setup(Source::None);

        let input = "10 -50\n12 -48\r\n11 -49";
        let count = controller.consume(input.as_bytes()).await?;

        assert_eq!(3, count);
        assert_eq!(
            vec![
                Sample::new(10.0, -50.0, 1_010),
                Sample::new(12.0, -48.0, 1_020),
                Sample::new(11.0, -49.0, 1_030),
            ],
            sample_rx.drain()
        );
        Ok(())
    }

    #[apply(test!)]
    async fn test_consume_drops_malformed_records() -> Result<(), ErrorBox> {
        let (mut controller, sample_rx, _) = setup(Source::None);

        let oversized = "9".repeat(MAX_RECORD_LEN * 3);
        let input = format!("garbage\n1.5 -60\n\n{oversized} -40\n2.5\n3.5 -61\n");
        let count = controller.consume(input.as_bytes()).await?;

        assert_eq!(2, count);
        let distances: Vec<f64> = sample_rx.drain().iter().map(|s| s.distance).collect();
        assert_eq!(vec![1.5, 3.5], distances);
        Ok(())
    }

    #[apply(test!)]
    async fn test_read_record_truncates_long_lines() -> Result<(), ErrorBox> {
        let long = "x".repeat(1000);
        let input = format!("{long}\nok\n");
        let mut reader = BufReader::with_capacity(16, input.as_bytes());
        let mut line = Vec::new();

        assert_eq!(1001, read_record(&mut reader, &mut line).await?);
        assert_eq!(MAX_RECORD_LEN + 1, line.len());

        assert_eq!(3, read_record(&mut reader, &mut line).await?);
        assert_eq!(b"ok".to_vec(), line);

        assert_eq!(0, read_record(&mut reader, &mut line).await?);
        Ok(())
    }

    #[apply(test!)]
    async fn test_run_reads_command_and_requests_reset_on_restart() -> Result<(), ErrorBox> {
        let (mut controller, sample_rx, reset_rx) = setup(Source::Cmd {
            command: "printf '4.5 -55\\n'".to_string(),
        });

        let run = async {
            controller.run().await;
        };
        let wait = async {
            reset_rx.recv().await.expect("reset_rx closed unexpectedly");
        };
        smol::future::or(run, wait).await;

        assert_eq!(4.5, sample_rx.recv().await?.distance);
        Ok(())
    }

    #[apply(test!)]
    async fn test_run_reads_regular_file_once() -> Result<(), ErrorBox> {
        let path = std::env::temp_dir().join(format!("rangewatch-source-{}", std::process::id()));
        smol::fs::write(&path, "1.5 -60\n2.5 -61\n").await?;
        let (mut controller, sample_rx, reset_rx) = setup(Source::File { path: path.clone() });

        let run = async {
            controller.run().await;
            true
        };
        let timeout = async {
            Timer::after(Duration::from_secs(10)).await;
            false
        };
        let returned = smol::future::or(run, timeout).await;
        smol::fs::remove_file(&path).await?;

        assert!(returned);
        let distances: Vec<f64> = sample_rx.drain().iter().map(|s| s.distance).collect();
        assert_eq!(vec![1.5, 2.5], distances);
        assert!(reset_rx.is_empty());
        Ok(())
    }

    #[apply(test!)]
    async fn test_run_without_source_returns() -> Result<(), ErrorBox> {
        let (mut controller, sample_rx, reset_rx) = setup(Source::None);

        controller.run().await;

        assert!(sample_rx.is_empty());
        assert!(reset_rx.is_empty());
        Ok(())
    }
}
