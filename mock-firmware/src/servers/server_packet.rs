use crate::mixer::MixerError;
use crate::primary_worker::{MixerCommand, MixerSender};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use anyhow::{anyhow, Context};
use log::error;
use mixia_ipc::{
    ErrorResponse, MuteChannelRequest, MuteChannelResponse, ResetResponse, SetVolumeRequest,
    SetVolumeResponse,
};
use mixia_types::MixerState;
use tokio::sync::oneshot;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Mixer(#[from] MixerError),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Mixer(MixerError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Mixer(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Mixer(error) => ErrorResponse::new(error.to_string()),
            ApiError::Internal(error) => {
                // Only the outer context goes back over the wire, the full chain stays here.
                error!("Error: {:?}", error);
                ErrorResponse {
                    error: "Internal server error".into(),
                    message: Some(error.to_string()),
                    path: None,
                }
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

async fn dispatch<T>(
    mixer_tx: &MixerSender,
    command: impl FnOnce(oneshot::Sender<T>) -> MixerCommand,
) -> anyhow::Result<T> {
    let (tx, rx) = oneshot::channel();
    mixer_tx
        .send(command(tx))
        .await
        .map_err(|e| anyhow!(e.to_string()))
        .context("Could not communicate with the mixer")?;
    rx.await.context("Could not execute the command on the mixer")
}

pub async fn handle_set_volume(
    request: SetVolumeRequest,
    mixer_tx: &MixerSender,
) -> Result<SetVolumeResponse, ApiError> {
    let (instrument, state) =
        dispatch(mixer_tx, |tx| MixerCommand::SetVolume(request, tx)).await??;

    Ok(SetVolumeResponse {
        message: format!("Volume set successfully for {}", instrument),
        instrument,
        volume: state.volume,
        state,
    })
}

pub async fn handle_mute_channel(
    request: MuteChannelRequest,
    mixer_tx: &MixerSender,
) -> Result<MuteChannelResponse, ApiError> {
    let (instrument, state) =
        dispatch(mixer_tx, |tx| MixerCommand::ToggleMute(request, tx)).await??;

    let action = if state.muted { "muted" } else { "unmuted" };
    Ok(MuteChannelResponse {
        message: format!("{} {}", instrument, action),
        instrument,
        muted: state.muted,
        state,
    })
}

pub async fn handle_status(mixer_tx: &MixerSender) -> Result<MixerState, ApiError> {
    Ok(dispatch(mixer_tx, MixerCommand::SendStatus).await?)
}

pub async fn handle_reset(mixer_tx: &MixerSender) -> Result<ResetResponse, ApiError> {
    let state = dispatch(mixer_tx, MixerCommand::Reset).await?;
    Ok(ResetResponse {
        message: "Mixer reset successfully".into(),
        state,
    })
}
