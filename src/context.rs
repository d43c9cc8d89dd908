//! Top-level player state: one decoder, one scheduler, one configuration.

use std::io;
use std::path::Path;

use log::{debug, info};

use crate::decoder::{BackendMode, Decoder, DecoderError, FrameSource};
use crate::format::{AssetHeader, Transport};
use crate::ingest::{IngestError, Staged, Upload};
use crate::playback::{Clock, DisplaySink, MonotonicClock, Scheduler, Tick};
use crate::schema::{ConfigError, PlayerConfig};

/// Owns the decoder facade and the playback scheduler and keeps them in
/// step: every committed asset restarts playback at frame zero, and every
/// backend switch or clear returns it to idle.
///
/// Usage:
/// ```ignore
/// let mut ctx = MatrixContext::new(PlayerConfig::default())?;
/// ctx.restore()?;
/// loop {
///     ctx.update_display(&mut sink);
/// }
/// ```
#[derive(Debug)]
pub struct MatrixContext<C: Clock = MonotonicClock> {
    decoder: Decoder,
    scheduler: Scheduler<C>,
    config: PlayerConfig,
}

impl MatrixContext<MonotonicClock> {
    pub fn new(config: PlayerConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> MatrixContext<C> {
    pub fn with_clock(config: PlayerConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut decoder = Decoder::new(config.mode, config.memory_limit);
        decoder.set_brightness(config.brightness);
        Ok(Self {
            decoder,
            scheduler: Scheduler::with_clock(clock),
            config,
        })
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn scheduler(&self) -> &Scheduler<C> {
        &self.scheduler
    }

    pub fn mode(&self) -> BackendMode {
        self.decoder.mode()
    }

    pub fn header(&self) -> Option<&AssetHeader> {
        self.decoder.header()
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    /// Load a persisted asset into the active backend and play it from
    /// frame zero. On failure the previous asset keeps playing.
    pub fn load_file(&mut self, path: &Path) -> Result<AssetHeader, DecoderError> {
        let header = self.decoder.load(path)?;
        self.scheduler.start(&header);
        info!(
            "Playing {}: {}x{}, {} frames at {} fps",
            path.display(),
            header.width,
            header.height,
            header.frame_count,
            header.fps
        );
        Ok(header)
    }

    /// Hand asset bytes directly to the active backend and play them from
    /// frame zero. Only the memory backend accepts this.
    pub fn set_image(
        &mut self,
        data: &[u8],
        transport: Transport,
    ) -> Result<AssetHeader, DecoderError> {
        let header = self.decoder.set_image(data, transport)?;
        self.scheduler.start(&header);
        info!(
            "Playing in-memory asset: {}x{}, {} frames at {} fps",
            header.width, header.height, header.frame_count, header.fps
        );
        Ok(header)
    }

    /// Load the persisted live asset if there is one. Returns `None`, leaving
    /// the context idle, when nothing has been persisted yet.
    pub fn restore(&mut self) -> Result<Option<AssetHeader>, DecoderError> {
        let live = self.config.storage.live_path.clone();
        if !live.exists() {
            debug!("No asset at {}, staying idle", live.display());
            return Ok(None);
        }
        self.load_file(&live).map(Some)
    }

    /// Activate the file backend. Playback goes idle if the mode changed.
    pub fn switch_to_file(&mut self) -> bool {
        let switched = self.decoder.switch_to_file();
        if switched {
            self.scheduler.reset();
        }
        switched
    }

    /// Activate the memory backend. Playback goes idle if the mode changed.
    pub fn switch_to_memory(&mut self) -> bool {
        let switched = self.decoder.switch_to_memory();
        if switched {
            self.scheduler.reset();
        }
        switched
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.decoder.set_brightness(brightness);
    }

    pub fn brightness(&self) -> f32 {
        self.decoder.brightness()
    }

    /// Present the next frame if it is due. See [`Scheduler::update_display`].
    pub fn update_display<D: DisplaySink + ?Sized>(&mut self, sink: &mut D) -> Tick {
        self.scheduler.update_display(&mut self.decoder, sink)
    }

    /// Open an upload targeting the active backend: staged to disk in file
    /// mode, buffered in RAM in memory mode. Chunks are limited to the
    /// configured chunk size.
    pub fn begin_upload(
        &self,
        declared: usize,
        transport: Transport,
    ) -> Result<Upload, IngestError> {
        let upload = match self.decoder.mode() {
            BackendMode::File => Upload::to_file(
                &self.config.storage.staging_path,
                &self.config.storage.live_path,
                declared,
                transport,
            )?,
            BackendMode::Memory => {
                Upload::to_memory(self.decoder.memory_limit(), declared, transport)?
            }
        };
        Ok(upload.with_chunk_limit(self.config.chunk_size))
    }

    /// Finish `upload` and swap the received asset in.
    ///
    /// Fails without touching storage or playback if the backend was
    /// switched since the upload began.
    pub fn commit_upload(&mut self, upload: Upload) -> Result<AssetHeader, IngestError> {
        let active = self.decoder.mode();
        if upload.backend_mode() != active {
            let err = IngestError::BackendChanged {
                upload: upload.backend_mode(),
                active,
            };
            upload.abort();
            return Err(err);
        }

        let header = match upload.finish()? {
            Staged::File(path) => self.load_file(&path)?,
            Staged::Memory(bytes) => self.set_image(&bytes, Transport::Raw)?,
        };
        Ok(header)
    }

    /// Drop the current asset and go idle.
    pub fn clear(&mut self) {
        self.decoder.clear();
        self.scheduler.reset();
    }

    /// Render the current frame once, regardless of pacing. Used for
    /// previews.
    pub fn present_current<D: DisplaySink + ?Sized>(&mut self, sink: &mut D) -> io::Result<()> {
        let index = self.scheduler.frame_index();
        let frame = self.decoder.frame(index).map_err(io::Error::other)?;
        let palette = self.decoder.palette().map_err(io::Error::other)?;
        sink.present(palette, &frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::decoder::{Backend, StateError};
    use crate::encoder::{RgbFrame, encode};
    use crate::format::LoadError;
    use crate::playback::{ManualClock, RecordingSink};
    use crate::schema::StorageConfig;
    use std::fs;
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};

    fn asset(frame_count: usize, fps: u8, tint: u8) -> Vec<u8> {
        let frames: Vec<_> = (0..frame_count)
            .map(|f| RgbFrame::from_fn(4, 2, |x, y| Rgb::new(tint, (x * 40) as u8, (y + f) as u8)))
            .collect();
        encode(&frames, fps).unwrap()
    }

    fn context(mode: BackendMode) -> (MatrixContext<ManualClock>, ManualClock, TempDir) {
        let dir = tempdir().unwrap();
        let config = PlayerConfig {
            mode,
            storage: StorageConfig {
                live_path: dir.path().join("latest.image"),
                staging_path: dir.path().join("temp.image"),
            },
            ..Default::default()
        };
        let clock = ManualClock::new();
        let ctx = MatrixContext::with_clock(config, clock.clone()).unwrap();
        (ctx, clock, dir)
    }

    fn advance_and_present(
        ctx: &mut MatrixContext<ManualClock>,
        clock: &ManualClock,
        sink: &mut RecordingSink,
        times: usize,
    ) {
        for _ in 0..times {
            ctx.update_display(sink);
            clock.advance(Duration::from_secs(1));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PlayerConfig {
            chunk_size: 3,
            ..Default::default()
        };
        assert!(MatrixContext::new(config).is_err());
    }

    #[test]
    fn test_restore_missing_is_idle() {
        let (mut ctx, _, _dir) = context(BackendMode::File);
        assert_eq!(ctx.restore().unwrap(), None);
        assert!(!ctx.is_playing());
    }

    #[test]
    fn test_restore_plays_live_asset() {
        let (mut ctx, _, _dir) = context(BackendMode::File);
        fs::write(&ctx.config().storage.live_path, asset(3, 5, 9)).unwrap();

        let header = ctx.restore().unwrap().unwrap();
        assert_eq!(header.frame_count, 3);
        assert!(ctx.is_playing());

        let mut sink = RecordingSink::new();
        assert_eq!(ctx.update_display(&mut sink), Tick::Presented { frame: 0 });
    }

    #[test]
    fn test_switch_releases_buffer_and_resets() {
        let (mut ctx, clock, _dir) = context(BackendMode::Memory);
        ctx.set_image(&asset(3, 5, 1), Transport::Raw).unwrap();

        let mut sink = RecordingSink::new();
        advance_and_present(&mut ctx, &clock, &mut sink, 2);
        assert_eq!(ctx.scheduler().frame_index(), 2);

        assert!(ctx.switch_to_file());
        assert!(!ctx.is_playing());
        assert_eq!(ctx.scheduler().frame_index(), 0);
        assert!(matches!(ctx.decoder().backend(), Backend::File(_)));
        assert!(ctx.header().is_none());
        assert_eq!(ctx.update_display(&mut sink), Tick::Idle);

        // Same mode again is a no-op.
        assert!(!ctx.switch_to_file());
    }

    #[test]
    fn test_file_mode_rejects_direct_bytes() {
        let (mut ctx, _, _dir) = context(BackendMode::File);
        assert!(matches!(
            ctx.set_image(&asset(1, 1, 0), Transport::Raw),
            Err(DecoderError::State(StateError::DirectBytesUnsupported))
        ));
        assert!(!ctx.is_playing());
    }

    #[test]
    fn test_zero_frame_asset_never_plays() {
        let (mut ctx, _, _dir) = context(BackendMode::Memory);
        assert!(matches!(
            ctx.set_image(&[2, 2, 0, 1, 5, 0, 0, 0], Transport::Raw),
            Err(DecoderError::Load(LoadError::ZeroFrames))
        ));
        assert!(!ctx.is_playing());
    }

    #[test]
    fn test_failed_swap_keeps_playing() {
        let (mut ctx, clock, _dir) = context(BackendMode::Memory);
        ctx.set_image(&asset(3, 5, 7), Transport::Raw).unwrap();
        let mut sink = RecordingSink::new();
        advance_and_present(&mut ctx, &clock, &mut sink, 1);

        let mut truncated = asset(3, 5, 8);
        truncated.pop();
        assert!(ctx.set_image(&truncated, Transport::Raw).is_err());

        assert!(ctx.is_playing());
        assert_eq!(ctx.update_display(&mut sink), Tick::Presented { frame: 1 });
        let (palette, _) = sink.last().unwrap();
        assert_eq!(palette[0].r, 7);
    }

    #[test]
    fn test_memory_upload_roundtrip() {
        let (mut ctx, _, _dir) = context(BackendMode::Memory);
        let data = asset(2, 4, 3);
        let wrapped = Transport::Base64.encode(&data);

        let mut upload = ctx.begin_upload(wrapped.len(), Transport::Base64).unwrap();
        for chunk in wrapped.chunks(ctx.config().chunk_size) {
            upload.push(chunk).unwrap();
        }
        let header = ctx.commit_upload(upload).unwrap();
        assert_eq!(header.frame_count, 2);
        assert!(ctx.is_playing());
    }

    #[test]
    fn test_file_upload_persists_and_restores() {
        let (mut ctx, clock, dir) = context(BackendMode::File);
        let data = asset(2, 4, 5);

        let mut upload = ctx.begin_upload(data.len(), Transport::Raw).unwrap();
        upload.push(&data).unwrap();
        ctx.commit_upload(upload).unwrap();
        assert_eq!(fs::read(dir.path().join("latest.image")).unwrap(), data);

        // A fresh context picks the asset up again.
        let mut restored = MatrixContext::with_clock(ctx.config().clone(), clock).unwrap();
        assert!(restored.restore().unwrap().is_some());
    }

    #[test]
    fn test_incomplete_upload_keeps_current_asset() {
        let (mut ctx, _, _dir) = context(BackendMode::File);
        let first = asset(2, 4, 1);
        fs::write(&ctx.config().storage.live_path, &first).unwrap();
        ctx.restore().unwrap();

        let second = asset(3, 4, 2);
        let mut upload = ctx.begin_upload(second.len(), Transport::Raw).unwrap();
        upload.push(&second[..10]).unwrap();
        assert!(matches!(
            ctx.commit_upload(upload),
            Err(IngestError::Incomplete { .. })
        ));

        assert_eq!(ctx.header().unwrap().frame_count, 2);
        assert_eq!(fs::read(&ctx.config().storage.live_path).unwrap(), first);
    }

    #[test]
    fn test_brightness_applies_to_presents() {
        let (mut ctx, _, _dir) = context(BackendMode::Memory);
        ctx.set_image(&asset(1, 1, 200), Transport::Raw).unwrap();
        ctx.set_brightness(0.0);
        assert_eq!(ctx.brightness(), 0.0);

        let mut sink = RecordingSink::new();
        ctx.present_current(&mut sink).unwrap();
        let (palette, _) = sink.last().unwrap();
        assert!(palette.iter().all(|&c| c == Rgb::BLACK));
    }

    #[test]
    fn test_clear_goes_idle() {
        let (mut ctx, _, _dir) = context(BackendMode::Memory);
        ctx.set_image(&asset(1, 1, 0), Transport::Raw).unwrap();
        ctx.clear();
        assert!(!ctx.is_playing());
        assert!(ctx.header().is_none());
    }

    #[test]
    fn test_upload_chunks_limited_by_config() {
        let (ctx, _, _dir) = context(BackendMode::Memory);
        let data = asset(2, 4, 3);
        let mut upload = ctx.begin_upload(data.len() + 400, Transport::Raw).unwrap();
        let oversized = vec![0u8; ctx.config().chunk_size + 1];
        assert!(matches!(
            upload.push(&oversized),
            Err(IngestError::ChunkTooLarge { len: 401, limit: 400 })
        ));
    }

    #[test]
    fn test_backend_switch_during_upload() {
        let (mut ctx, _, dir) = context(BackendMode::File);
        let data = asset(2, 4, 6);

        let mut upload = ctx.begin_upload(data.len(), Transport::Raw).unwrap();
        upload.push(&data).unwrap();
        ctx.switch_to_memory();

        assert!(matches!(
            ctx.commit_upload(upload),
            Err(IngestError::BackendChanged {
                upload: BackendMode::File,
                active: BackendMode::Memory,
            })
        ));
        assert!(!dir.path().join("latest.image").exists());
        assert!(!dir.path().join("temp.image").exists());
        assert!(!ctx.is_playing());
    }
}
