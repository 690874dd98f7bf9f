//! `shapeboard`: inspect saved drawings from the command line.

use clap::{Parser, Subcommand};
use kurbo::Point;
use shapeboard_core::{ConfigError, DocumentError, EditorConfig, EditorSession, Orientation, ShapeId};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Error)]
enum AppError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Invalid shape id '{0}'")]
    InvalidShapeId(String),
    #[error("No shape with id {0} in the document")]
    ShapeNotFound(ShapeId),
}

#[derive(Parser, Debug)]
#[command(name = "shapeboard", version, about = "Inspect Shapeboard documents")]
struct Cli {
    /// Editor config file (JSON).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the canvas and every shape in paint order.
    Info {
        document: PathBuf,
    },
    /// Drag a shape to a position and report how it snaps.
    Snap {
        document: PathBuf,
        shape_id: String,
        x: f64,
        y: f64,
        /// Overrides the configured snap tolerance.
        tolerance: Option<f64>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, AppError> {
    let mut config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    match cli.command {
        Commands::Info { document } => {
            let session = open(&document, config)?;
            Ok(info_report(&session))
        }
        Commands::Snap {
            document,
            shape_id,
            x,
            y,
            tolerance,
        } => {
            if let Some(tolerance) = tolerance {
                config.snap.tolerance = tolerance;
            }
            let id = ShapeId::parse_str(&shape_id)
                .map_err(|_| AppError::InvalidShapeId(shape_id.clone()))?;
            let mut session = open(&document, config)?;
            snap_report(&mut session, id, Point::new(x, y))
        }
    }
}

fn open(path: &Path, config: EditorConfig) -> Result<EditorSession, AppError> {
    let json = std::fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let mut session = EditorSession::try_new(config)?;
    session.load_document(&json)?;
    Ok(session)
}

fn info_report(session: &EditorSession) -> String {
    let option = session.canvas_option();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "canvas {}x{} background {}",
        option.canvas_size.width, option.canvas_size.height, option.bg_color
    );
    let _ = writeln!(out, "{} shapes", session.shapes().len());
    for (z, shape) in session.shapes().iter().enumerate() {
        let b = shape.bounds();
        let _ = writeln!(
            out,
            "{z:>3} {} {:<9} ({:.1}, {:.1}) - ({:.1}, {:.1})",
            shape.id(),
            shape.shape_type().name(),
            b.x0,
            b.y0,
            b.x1,
            b.y1
        );
    }
    out
}

fn snap_report(session: &mut EditorSession, id: ShapeId, to: Point) -> Result<String, AppError> {
    if !session.begin_drag(&[id]) {
        return Err(AppError::ShapeNotFound(id));
    }
    let outcome = session.drag_to(to).unwrap_or_default();
    session.end_drag();

    let mut out = String::new();
    let fmt_delta = |d: Option<f64>| d.map_or_else(|| "none".to_string(), |d| format!("{d:.2}"));
    let _ = writeln!(out, "dx {}", fmt_delta(outcome.dx));
    let _ = writeln!(out, "dy {}", fmt_delta(outcome.dy));
    if let Some(shape) = session.get(id) {
        let _ = writeln!(out, "position ({:.2}, {:.2})", shape.x, shape.y);
    }
    for guide in &outcome.guides {
        let axis = match guide.orientation {
            Orientation::Vertical => "V",
            Orientation::Horizontal => "H",
        };
        let _ = writeln!(
            out,
            "guide {axis} at {:.2} from {:.2} to {:.2}",
            guide.position, guide.start, guide.end
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(rect_id: ShapeId, circle_id: ShapeId) -> String {
        format!(
            r##"{{"canvas": {{"width": 800, "height": 600, "bgColor": "#ffffff", "children": [
                {{"id": "{rect_id}", "type": "rectangle", "x": 10, "y": 10, "width": 50, "height": 50}},
                {{"id": "{circle_id}", "type": "circle", "x": 100, "y": 100, "radius": 20}}
            ]}}}}"##
        )
    }

    fn session() -> (EditorSession, ShapeId) {
        let rect = ShapeId::new_v4();
        let mut session = EditorSession::default();
        session.load_document(&document(rect, ShapeId::new_v4())).unwrap();
        (session, rect)
    }

    #[test]
    fn test_cli_parses_snap() {
        let cli = Cli::try_parse_from(["shapeboard", "snap", "doc.json", "abc", "98", "10", "4"]).unwrap();
        match cli.command {
            Commands::Snap { tolerance, x, .. } => {
                assert_eq!(tolerance, Some(4.0));
                assert!((x - 98.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_info_report() {
        let (session, rect) = session();
        let report = info_report(&session);
        assert!(report.starts_with("canvas 800x600 background #ffffff"));
        assert!(report.contains("2 shapes"));
        assert!(report.contains(&rect.to_string()));
        assert!(report.contains("circle"));
    }

    #[test]
    fn test_snap_report() {
        let (mut session, rect) = session();
        let report = snap_report(&mut session, rect, Point::new(98.0, 10.0)).unwrap();
        assert!(report.contains("dx 2.00"));
        assert!(report.contains("dy none"));
        assert!(report.contains("position (100.00, 10.00)"));
        assert!(report.contains("guide V at 100.00"));
    }

    #[test]
    fn test_snap_unknown_shape() {
        let (mut session, _) = session();
        let missing = ShapeId::new_v4();
        assert!(matches!(
            snap_report(&mut session, missing, Point::ZERO),
            Err(AppError::ShapeNotFound(id)) if id == missing
        ));
    }
}
