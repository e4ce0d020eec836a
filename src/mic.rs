//! Live microphone capture via cpal.
//!
//! cpal delivers audio through a callback on its own thread; the session wants blocking
//! pull semantics. [`MicSource`] bridges the two with a bounded channel: the callback
//! accumulates fixed-size chunks and hands them over, `next_chunk` blocks on the receiver.

use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SampleRate, SizedSample, Stream, StreamConfig};
use tracing::{error, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::source::ChunkSource;

/// How many captured chunks may sit in flight before the callback starts dropping.
const CHANNEL_DEPTH: usize = 64;

type ChunkMessage = std::result::Result<Vec<i16>, String>;

/// Blocking chunk source over the default input device.
pub struct MicSource {
    rx: mpsc::Receiver<ChunkMessage>,
    // Dropping the stream stops capture; keep it alive for the source's lifetime.
    _stream: Stream,
}

impl MicSource {
    /// Open the default input device at the session's rate, channel count, and chunk size.
    pub fn open(config: &Config) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::device("no default input device available"))?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".into());

        let sample_format = device
            .default_input_config()
            .map_err(|err| Error::device(format!("failed to get default input config: {err}")))?
            .sample_format();

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        info!(
            device = %device_name,
            rate = config.sample_rate,
            channels = config.channels,
            format = ?sample_format,
            "opening input device"
        );

        let (tx, rx) = mpsc::sync_channel(CHANNEL_DEPTH);
        let chunk_samples = config.chunk_samples();

        let stream = match sample_format {
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, chunk_samples, tx)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, chunk_samples, tx)?,
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, chunk_samples, tx)?,
            other => {
                return Err(Error::device(format!(
                    "unsupported input sample format: {other:?}"
                )));
            }
        };

        stream
            .play()
            .map_err(|err| Error::device(format!("failed to start input stream: {err}")))?;

        Ok(Self { rx, _stream: stream })
    }
}

impl ChunkSource for MicSource {
    fn next_chunk(&mut self) -> Result<Vec<i16>> {
        match self.rx.recv() {
            Ok(Ok(chunk)) => Ok(chunk),
            Ok(Err(message)) => Err(Error::device(message)),
            Err(_) => Err(Error::device("input stream disconnected")),
        }
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    stream_config: &StreamConfig,
    chunk_samples: usize,
    tx: mpsc::SyncSender<ChunkMessage>,
) -> Result<Stream>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    let err_tx = tx.clone();
    let mut pending: Vec<i16> = Vec::with_capacity(chunk_samples * 2);

    device
        .build_input_stream(
            stream_config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                for &sample in data {
                    pending.push(i16::from_sample(sample));
                }
                while pending.len() >= chunk_samples {
                    let chunk: Vec<i16> = pending.drain(..chunk_samples).collect();
                    // A full queue means the consumer stalled; dropping audio there beats
                    // blocking the device callback.
                    let _ = tx.try_send(Ok(chunk));
                }
            },
            move |err| {
                error!(%err, "input stream error");
                let _ = err_tx.try_send(Err(err.to_string()));
            },
            None,
        )
        .map_err(|err| Error::device(format!("failed to build input stream: {err}")))
}
