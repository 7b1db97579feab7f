use crate::{
    events::history,
    AppError,
    AppState,
};
use axum::{
    extract::State,
    http::header::{
        CACHE_CONTROL,
        CONTENT_DISPOSITION,
        CONTENT_TYPE,
    },
    response::{
        IntoResponse,
        Response,
    },
};
use chrono::Local;
use dsl_monitor_supervisor::LineData;
use std::io::{
    Cursor,
    Write,
};
use zip::{
    write::FileOptions,
    ZipWriter,
};

/// The latest observation as `dsl_<timestamp>.zip`. Only available while the supervisor is ready.
pub(crate) async fn handler(State(state): State<AppState>) -> Result<Response, AppError> {
    let change = state.supervisor.state().await?;
    if !change.is_ready() {
        return Err(AppError::NotReady);
    }
    let data = change.data.ok_or(AppError::NotReady)?;

    let base_name = data.time.with_timezone(&Local).format("dsl_%Y%m%d_%H%M%S").to_string();
    let archive = archive(&base_name, &data, state.config.hide_raw_data)?;
    debug!(file = %base_name, size = archive.len(), "Serving download");

    let headers = [
        (CONTENT_TYPE, "application/zip".to_string()),
        (CONTENT_DISPOSITION, format!("attachment; filename=\"{base_name}.zip\"")),
        (CACHE_CONTROL, "no-cache".to_string()),
    ];
    Ok((headers, archive).into_response())
}

pub(crate) fn archive(base_name: &str, data: &LineData, hide_raw_data: bool) -> Result<Vec<u8>, AppError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();

    zip.start_file(format!("{base_name}_summary.txt"), options)?;
    zip.write_all(data.status.summary().as_bytes())?;

    if !hide_raw_data {
        zip.start_file(format!("{base_name}_raw.txt"), options)?;
        zip.write_all(&data.raw_data)?;
    }

    zip.start_file(format!("{base_name}_bins.json"), options)?;
    serde_json::to_writer_pretty(&mut zip, &data.bins)?;

    zip.start_file(format!("{base_name}_history.json"), options)?;
    serde_json::to_writer_pretty(&mut zip, &history(data))?;

    zip.start_file(format!("{base_name}_history.txt"), options)?;
    write!(zip, "{}", data.errors_history)?;

    Ok(zip.finish()?.into_inner())
}
