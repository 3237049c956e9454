//! Pipeline lifecycle integration tests.
//!
//! These tests drive the orchestrator with mock metadata, stream source and
//! muxer:
//! - State transitions for successful and failed runs
//! - Format selection and encoder argument planning
//! - Output file preparation
//! - Progress display teardown

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;

use tubemux_core::muxer::{AudioCodecPlan, InputLayout, MuxError};
use tubemux_core::selector::{MediaFormat, MediaKind, MediaType};
use tubemux_core::testing::{
    fixtures, CapturedDisplay, MockMetadataProvider, MockMuxer, MockStreamSource,
};
use tubemux_core::{
    AudioMode, PipelineConfig, PipelineContext, PipelineError, PipelineOrchestrator,
    PipelineState,
};

const CLEAR_BELOW: &str = "\r\x1b[0J";

/// Test helper wiring the orchestrator to mocks.
struct TestHarness {
    metadata: Arc<MockMetadataProvider>,
    source: Arc<MockStreamSource>,
    muxer: Arc<MockMuxer>,
    output_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self {
            metadata: Arc::new(MockMetadataProvider::new()),
            source: Arc::new(MockStreamSource::new()),
            muxer: Arc::new(MockMuxer::new()),
            output_dir: TempDir::new().unwrap(),
        }
    }

    fn output_dir(&self) -> &Path {
        self.output_dir.path()
    }

    fn context(&self, audio: Option<AudioMode>) -> PipelineContext {
        PipelineContext::new(
            self.metadata.clone(),
            self.source.clone(),
            self.muxer.clone(),
            PipelineConfig::new(self.output_dir())
                .with_audio(audio)
                .with_tick_interval(Duration::from_millis(5)),
        )
    }

    /// Builds an orchestrator that records every state it enters.
    fn orchestrator(
        &self,
        identifier: &str,
        audio: Option<AudioMode>,
    ) -> (PipelineOrchestrator, Arc<Mutex<Vec<PipelineState>>>) {
        let states = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&states);
        let orchestrator = PipelineOrchestrator::new(identifier, self.context(audio))
            .on_state_change(move |state| recorder.lock().unwrap().push(state));
        (orchestrator, states)
    }
}

fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
    args.windows(2).any(|w| w[0] == flag && w[1] == value)
}

#[tokio::test]
async fn test_compound_run_muxes_two_inputs() {
    let harness = TestHarness::new();
    harness
        .metadata
        .add_info(fixtures::media_info(fixtures::SOURCE_ID, fixtures::compound_formats()))
        .await;
    harness.source.add_stream("137", fixtures::chunked_body(6000, 1000)).await;
    harness.source.add_stream("140", fixtures::chunked_body(1500, 500)).await;
    harness
        .muxer
        .set_progress_output("frame=120\nfps=29.97\nout_time=00:01:02.345000\nprogress=end\n")
        .await;
    harness.muxer.set_delay(Duration::from_millis(30)).await;

    let display = CapturedDisplay::new();
    let (orchestrator, states) = harness.orchestrator(fixtures::SOURCE_ID, None);
    let outcome = orchestrator
        .with_display(display.sink())
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.kind, MediaType::Compound);
    assert_eq!(outcome.file_name, "Rick Astley — Never Gonna Give You Up.mp4");
    assert_eq!(outcome.output_path, harness.output_dir().join(&outcome.file_name));
    assert_eq!(std::fs::metadata(&outcome.output_path).unwrap().len(), 7500);

    let jobs = harness.muxer.recorded_jobs().await;
    assert_eq!(jobs.len(), 1);
    let job = &jobs[0];
    assert_eq!(job.plan.layout, InputLayout::Compound);
    assert_eq!(job.format_ids, vec!["137", "140"]);
    assert_eq!(job.input_bytes, vec![6000, 1500]);
    assert!(has_pair(&job.args, "-i", "pipe:4"));
    assert!(has_pair(&job.args, "-i", "pipe:5"));
    assert!(has_pair(&job.args, "-map", "0:v"));
    assert!(has_pair(&job.args, "-map", "1:a"));
    assert!(has_pair(&job.args, "-progress", "pipe:3"));

    assert_eq!(
        *states.lock().unwrap(),
        vec![
            PipelineState::ResolvingMetadata,
            PipelineState::SelectingMedia,
            PipelineState::Transferring,
            PipelineState::Finalizing,
            PipelineState::Done,
        ]
    );

    // The tick is cancelled: nothing is drawn after the run resolves.
    let drawn = display.contents();
    assert!(drawn.contains("Video download: 100.00 %"));
    assert!(drawn.ends_with(CLEAR_BELOW));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(display.contents(), drawn);
}

#[tokio::test]
async fn test_audio_only_mp3_picks_standard_bitrate() {
    let harness = TestHarness::new();
    harness
        .metadata
        .add_info(fixtures::media_info(fixtures::SOURCE_ID, fixtures::audio_formats()))
        .await;
    harness.source.add_stream("251", fixtures::chunked_body(2048, 512)).await;

    let (orchestrator, _) = harness.orchestrator(fixtures::SOURCE_ID, Some(AudioMode::Mp3));
    let outcome = orchestrator.run().await.unwrap();

    assert_eq!(outcome.kind, MediaType::Audio);
    assert!(outcome.file_name.ends_with(".mp3"));

    let jobs = harness.muxer.recorded_jobs().await;
    let job = &jobs[0];
    assert_eq!(job.plan.layout, InputLayout::Audio);
    assert_eq!(
        job.plan.audio_codec,
        AudioCodecPlan::Mp3 {
            bitrate_kbps: Some(192)
        }
    );
    assert!(has_pair(&job.args, "-b:a", "192k"));
    assert!(has_pair(&job.args, "-map", "0:a"));
    assert!(!job.args.contains(&"pipe:5".to_string()));
    assert_eq!(harness.source.opened().await, vec!["251"]);
}

#[tokio::test]
async fn test_audio_only_original_keeps_container() {
    let harness = TestHarness::new();
    let formats = vec![
        MediaFormat::video("137", 5000.0, "mp4"),
        MediaFormat::audio("140", 128.0, "m4a"),
        MediaFormat::audio("251", 160.0, "webm"),
    ];
    harness
        .metadata
        .add_info(fixtures::media_info(fixtures::SOURCE_ID, formats))
        .await;
    harness.source.add_stream("251", vec![vec![1u8; 64]]).await;

    let (orchestrator, _) = harness.orchestrator(fixtures::SOURCE_ID, Some(AudioMode::Original));
    let outcome = orchestrator.run().await.unwrap();

    assert!(outcome.file_name.ends_with(".webm"));
    let jobs = harness.muxer.recorded_jobs().await;
    assert_eq!(jobs[0].plan.audio_codec, AudioCodecPlan::Copy);
    assert!(has_pair(&jobs[0].args, "-c:a", "copy"));
}

#[tokio::test]
async fn test_same_format_yields_mixed_single_stream() {
    let harness = TestHarness::new();
    let formats = vec![
        MediaFormat::mixed("22", 2000.0, 192.0, "mp4"),
        MediaFormat::video("18", 600.0, "mp4"),
        MediaFormat::audio("140", 128.0, "m4a"),
    ];
    harness
        .metadata
        .add_info(fixtures::media_info(fixtures::SOURCE_ID, formats))
        .await;
    harness.source.add_stream("22", vec![vec![0u8; 100]]).await;

    let (orchestrator, _) = harness.orchestrator(fixtures::SOURCE_ID, None);
    let outcome = orchestrator.run().await.unwrap();

    assert_eq!(outcome.kind, MediaType::Mixed);
    assert_eq!(harness.source.opened().await, vec!["22"]);

    let jobs = harness.muxer.recorded_jobs().await;
    assert_eq!(jobs[0].plan.layout, InputLayout::Mixed);
    assert!(has_pair(&jobs[0].args, "-map", "0:a"));
}

#[tokio::test]
async fn test_missing_video_fails_before_download() {
    let harness = TestHarness::new();
    harness
        .metadata
        .add_info(fixtures::media_info(fixtures::SOURCE_ID, fixtures::audio_formats()))
        .await;

    let (orchestrator, states) = harness.orchestrator(fixtures::SOURCE_ID, None);
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, PipelineError::MediaNotFound(MediaKind::Video)));
    assert!(err.is_before_download());
    assert!(harness.source.opened().await.is_empty());
    assert!(harness.muxer.recorded_jobs().await.is_empty());
    assert_eq!(
        states.lock().unwrap().last(),
        Some(&PipelineState::Failed)
    );
    assert_eq!(std::fs::read_dir(harness.output_dir()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_audio_fails_before_download() {
    let harness = TestHarness::new();
    harness
        .metadata
        .add_info(fixtures::media_info(
            fixtures::SOURCE_ID,
            vec![MediaFormat::video("137", 5000.0, "mp4")],
        ))
        .await;

    let (orchestrator, _) = harness.orchestrator(fixtures::SOURCE_ID, Some(AudioMode::Mp3));
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, PipelineError::MediaNotFound(MediaKind::Audio)));
    assert!(harness.source.opened().await.is_empty());
}

#[tokio::test]
async fn test_invalid_identifier_skips_metadata() {
    let harness = TestHarness::new();

    let (orchestrator, states) = harness.orchestrator("https://example.com/video", None);
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, PipelineError::InvalidSource { .. }));
    assert!(harness.metadata.resolved_ids().await.is_empty());
    assert_eq!(
        *states.lock().unwrap(),
        vec![PipelineState::ResolvingMetadata, PipelineState::Failed]
    );
}

#[tokio::test]
async fn test_metadata_failure() {
    let harness = TestHarness::new();

    let (orchestrator, _) =
        harness.orchestrator("https://youtu.be/dQw4w9WgXcQ", None);
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, PipelineError::MetadataUnavailable(_)));
    assert_eq!(harness.metadata.resolved_ids().await, vec![fixtures::SOURCE_ID]);
}

#[tokio::test]
async fn test_existing_output_is_replaced() {
    let harness = TestHarness::new();
    harness
        .metadata
        .add_info(fixtures::media_info(fixtures::SOURCE_ID, fixtures::compound_formats()))
        .await;
    harness.source.add_stream("137", vec![b"new-video".to_vec()]).await;
    harness.source.add_stream("140", vec![b"new-audio".to_vec()]).await;

    let existing = harness
        .output_dir()
        .join("Rick Astley — Never Gonna Give You Up.mp4");
    std::fs::write(&existing, b"stale content from an earlier run").unwrap();

    let (orchestrator, _) = harness.orchestrator(fixtures::SOURCE_ID, None);
    let outcome = orchestrator.run().await.unwrap();

    assert_eq!(outcome.output_path, existing);
    assert_eq!(std::fs::read(&existing).unwrap(), b"new-videonew-audio");
}

#[tokio::test]
async fn test_stream_open_failure() {
    let harness = TestHarness::new();
    harness
        .metadata
        .add_info(fixtures::media_info(fixtures::SOURCE_ID, fixtures::compound_formats()))
        .await;
    harness.source.add_stream("137", vec![vec![0u8; 10]]).await;

    let (orchestrator, states) = harness.orchestrator(fixtures::SOURCE_ID, None);
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, PipelineError::StreamUnavailable(_)));
    assert!(harness.muxer.recorded_jobs().await.is_empty());
    assert_eq!(
        *states.lock().unwrap(),
        vec![
            PipelineState::ResolvingMetadata,
            PipelineState::SelectingMedia,
            PipelineState::Transferring,
            PipelineState::Failed,
        ]
    );
}

#[tokio::test]
async fn test_encoding_failure_still_tears_down_display() {
    let harness = TestHarness::new();
    harness
        .metadata
        .add_info(fixtures::media_info(fixtures::SOURCE_ID, fixtures::compound_formats()))
        .await;
    harness.source.add_stream("137", vec![vec![0u8; 10]]).await;
    harness.source.add_stream("140", vec![vec![0u8; 10]]).await;
    harness.muxer.set_delay(Duration::from_millis(30)).await;
    harness
        .muxer
        .set_next_error(MuxError::EncodingFailed {
            code: Some(1),
            signal: None,
            stderr: Some("pipe:4: Invalid data found when processing input".to_string()),
        })
        .await;

    let display = CapturedDisplay::new();
    let (orchestrator, states) = harness.orchestrator(fixtures::SOURCE_ID, None);
    let err = orchestrator
        .with_display(display.sink())
        .run()
        .await
        .unwrap_err();

    match err {
        PipelineError::EncodingFailed { code, stderr, .. } => {
            assert_eq!(code, Some(1));
            assert!(stderr.unwrap().contains("Invalid data"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let recorded = states.lock().unwrap().clone();
    assert_eq!(
        &recorded[recorded.len() - 2..],
        &[PipelineState::Finalizing, PipelineState::Failed]
    );

    let drawn = display.contents();
    assert!(drawn.ends_with(CLEAR_BELOW));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(display.contents(), drawn);
}

#[tokio::test]
async fn test_dropped_run_clears_display() {
    let harness = TestHarness::new();
    harness
        .metadata
        .add_info(fixtures::media_info(fixtures::SOURCE_ID, fixtures::compound_formats()))
        .await;
    harness.source.add_stream("137", vec![vec![0u8; 10]]).await;
    harness.source.add_stream("140", vec![vec![0u8; 10]]).await;
    harness.muxer.set_delay(Duration::from_secs(3600)).await;

    let display = CapturedDisplay::new();
    let (orchestrator, states) = harness.orchestrator(fixtures::SOURCE_ID, None);
    let run = orchestrator.with_display(display.sink()).run();

    // Interrupting a run drops it while the encoder is still working.
    let interrupted = tokio::time::timeout(Duration::from_millis(50), run).await;
    assert!(interrupted.is_err());

    let drawn = display.contents();
    assert!(drawn.contains("Result conversion:"));
    assert!(drawn.ends_with(CLEAR_BELOW));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(display.contents(), drawn);

    assert_eq!(
        states.lock().unwrap().last(),
        Some(&PipelineState::Transferring)
    );
}
