use futures::{Stream, StreamExt};
use log::{info, warn};

use crate::characteristic::Characteristic;
use crate::session::BleSession;

/// A speech recognition result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// A partial hypothesis that may still change.
    Interim(String),
    Final(String),
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RelayStats {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Sends every non-empty final transcript to the device until the stream ends.
///
/// Interim results are never sent. A failed send is logged and the relay carries on with the
/// next transcript.
pub async fn relay_transcripts<S, C>(transcripts: S, session: &mut BleSession<C>) -> RelayStats
where
    S: Stream<Item = TranscriptEvent>,
    C: Characteristic,
{
    let mut transcripts = std::pin::pin!(transcripts);
    let mut stats = RelayStats::default();

    while let Some(event) = transcripts.next().await {
        let TranscriptEvent::Final(text) = event else {
            stats.skipped += 1;
            continue;
        };

        let text = text.trim();
        if text.is_empty() {
            stats.skipped += 1;
            continue;
        }

        match session.send(text).await {
            Ok(report) => {
                info!("Sent {:?} ({} writes)", text, report.writes);
                stats.sent += 1;
            }
            Err(e) => {
                warn!("Unable to send {:?}: {}", text, e);
                stats.failed += 1;
            }
        }
    }
    stats
}
