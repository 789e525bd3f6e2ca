use crate::mixer::{Mixer, MixerError};
use crate::Shutdown;
use log::{debug, info};
use mixia_ipc::{MuteChannelRequest, SetVolumeRequest};
use mixia_types::{ChannelState, Instrument, MixerState};
use tokio::sync::{mpsc, oneshot};

pub type ChannelResult = Result<(Instrument, ChannelState), MixerError>;

pub enum MixerCommand {
    SetVolume(SetVolumeRequest, oneshot::Sender<ChannelResult>),
    ToggleMute(MuteChannelRequest, oneshot::Sender<ChannelResult>),
    SendStatus(oneshot::Sender<MixerState>),
    Reset(oneshot::Sender<MixerState>),
}

pub type MixerSender = mpsc::Sender<MixerCommand>;
pub type MixerReceiver = mpsc::Receiver<MixerCommand>;

// The worker is the only owner of the mixer, so every request is applied in the order it
// arrives, and never half way through another.
pub async fn spawn_mixer_worker(mut command_rx: MixerReceiver, mut shutdown: Shutdown, mut mixer: Mixer) {
    debug!("Starting Mixer Worker..");
    loop {
        tokio::select! {
            () = shutdown.recv() => {
                info!("Shutting down mixer worker");
                return;
            },
            command = command_rx.recv() => {
                let Some(command) = command else {
                    debug!("All mixer senders dropped, stopping worker");
                    return;
                };

                // A dropped receiver just means the HTTP client went away, nothing to do.
                match command {
                    MixerCommand::SetVolume(request, sender) => {
                        let _ = sender.send(mixer.set_volume(request.instrument.as_deref(), request.volume.as_ref()));
                    }
                    MixerCommand::ToggleMute(request, sender) => {
                        let _ = sender.send(mixer.toggle_mute(request.instrument.as_deref()));
                    }
                    MixerCommand::SendStatus(sender) => {
                        let _ = sender.send(mixer.status());
                    }
                    MixerCommand::Reset(sender) => {
                        let _ = sender.send(mixer.reset());
                    }
                }
            }
        }
    }
}
