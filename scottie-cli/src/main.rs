pub mod args;
pub mod files;
pub mod station;

use std::{
    fs::{
        File,
        OpenOptions,
    },
    io::BufWriter,
    path::PathBuf,
    sync::Arc,
};

use clap::Parser;
use color_eyre::eyre::{
    Error,
    bail,
};
use scottie::{
    HeaderRasterizer,
    ModeSpecification,
    Raster,
    Transmitter,
    audio,
    oscillator::{
        Nco,
        ToneRecorder,
    },
    sink::wav::WavSink,
    timebase::{
        RealtimeTimebase,
        SimClock,
        SimulatedTimebase,
    },
};
use tracing_subscriber::EnvFilter;

use crate::{
    args::{
        Args,
        Command,
    },
    files::AppFiles,
    station::Station,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!(?args);

    let mut station = match &args.station {
        Some(path) => Station::from_path(path)?,
        None => AppFiles::new()?.station()?,
    };

    let result = match args.command {
        Command::Prepare {
            input,
            output,
            header,
        } => {
            station.apply_header_args(header);
            prepare(&station, input, output)
        }
        Command::Overlay { raster, header } => {
            station.apply_header_args(header);
            overlay(&station, raster)
        }
        Command::Render {
            input,
            output,
            transmit,
        } => {
            station.apply_transmit_args(&transmit);
            station.check()?;
            render(&station, input, output).await
        }
        Command::Transmit {
            input,
            volume,
            transmit,
        } => {
            station.apply_transmit_args(&transmit);
            station.check()?;
            play(&station, input, volume).await
        }
    };

    if let Err(error) = &result {
        tracing::error!(?error);
    }

    result
}

fn prepare(station: &Station, input: PathBuf, output: PathBuf) -> Result<(), Error> {
    let mode = ModeSpecification::S1;
    let mut raster = Raster::open_image(&input, mode.pixels_per_line, mode.num_lines)?;

    let telemetry = station.telemetry_line();
    HeaderRasterizer::new(&station.callsign, &telemetry).draw_raster(&mut raster);

    raster.write_to(BufWriter::new(File::create(&output)?))?;
    tracing::info!(input = %input.display(), output = %output.display(), "raster prepared");
    Ok(())
}

fn overlay(station: &Station, path: PathBuf) -> Result<(), Error> {
    let mode = ModeSpecification::S1;
    let file = OpenOptions::new().read(true).write(true).open(&path)?;
    let size = file.metadata()?.len();
    if size < HeaderRasterizer::header_bytes(mode.pixels_per_line) as u64 {
        bail!("{} is too small to be a raster file", path.display());
    }

    let telemetry = station.telemetry_line();
    HeaderRasterizer::new(&station.callsign, &telemetry).draw_stream(file, mode.pixels_per_line)?;
    Ok(())
}

async fn render(station: &Station, input: PathBuf, output: PathBuf) -> Result<(), Error> {
    let config = station.render_config();
    let sample_rate = station.sample_rate;

    tokio::task::spawn_blocking(move || {
        let clock = SimClock::default();
        let recorder = Arc::new(ToneRecorder::new(clock.clone()));
        let mut transmitter =
            Transmitter::new(recorder.clone(), SimulatedTimebase::new(clock)).with_config(config);
        let summary = transmitter.transmit_file(&input)?;

        let mut sink = WavSink::from_path(&output, sample_rate)?;
        sink.write_tones(&recorder.tone_events())?;
        sink.finalize()?;

        tracing::info!(
            output = %output.display(),
            lines = summary.lines,
            duration = ?summary.elapsed,
            "rendered"
        );
        Ok::<_, Error>(())
    })
    .await??;

    Ok(())
}

async fn play(station: &Station, input: PathBuf, volume: f32) -> Result<(), Error> {
    let nco = Arc::new(Nco::default());
    audio::play(&nco, station.sample_rate, volume)?;

    let mut transmitter = Transmitter::new(nco.clone(), RealtimeTimebase::new())
        .with_config(station.transmit_config());
    let abort = transmitter.abort_handle();

    let mut transmission =
        tokio::task::spawn_blocking(move || transmitter.transmit_file(&input));

    let summary = tokio::select! {
        result = &mut transmission => result??,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("aborting transmission");
            abort.abort();
            transmission.await??
        }
    };

    tracing::info!(lines = summary.lines, duration = ?summary.elapsed, "transmitted");
    Ok(())
}
