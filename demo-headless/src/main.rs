use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use lumicalc_core::photometry::{parse_heuristic, parse_with, Resynchronization};
use lumicalc_core::{
    AtmosphereCondition, FluxSource, LightingStudy, Lumens, Lux, MaintenanceCategory,
    MaintenanceSelection, Meters, Months, ParseOptions, PhotometricTable, ResyncPolicy,
    RoomGeometry, StudyReport, SurfaceReflectances, WorkArea,
};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Which parser entry point reads the files.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ParseMode {
    /// LM-63 structure: tilt marker, header line, angle lists, candela grid
    #[default]
    Structured,
    /// First two long numeric rows as angles and candela
    Heuristic,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Resync {
    #[default]
    PlanesFirst,
    AnglesFirst,
    Reject,
}

impl From<Resync> for ResyncPolicy {
    fn from(resync: Resync) -> Self {
        match resync {
            Resync::PlanesFirst => ResyncPolicy::PlanesFirst,
            Resync::AnglesFirst => ResyncPolicy::AnglesFirst,
            Resync::Reject => ResyncPolicy::Reject,
        }
    }
}

/// Task area presets (NOM-025-STPS-2008 minimum illuminance)
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Area {
    #[default]
    Office,
    Classroom,
    Circulation,
    Exterior,
    Archive,
    Reception,
    Stairs,
    Production,
    Inspection,
}

impl From<Area> for WorkArea {
    fn from(area: Area) -> Self {
        match area {
            Area::Office => WorkArea::OfficeWork,
            Area::Classroom => WorkArea::Classroom,
            Area::Circulation => WorkArea::Circulation,
            Area::Exterior => WorkArea::Exterior,
            Area::Archive => WorkArea::ArchiveOrLibrary,
            Area::Reception => WorkArea::Reception,
            Area::Stairs => WorkArea::StairsAndRamps,
            Area::Production => WorkArea::DetailedProduction,
            Area::Inspection => WorkArea::InspectionOrPrecision,
        }
    }
}

/// Lumen-method sizing for one room, optionally driven by photometric files
#[derive(Parser, Debug)]
#[command(name = "lumicalc-demo")]
#[command(about = "Size a lighting installation from room data and photometry", long_about = None)]
struct Args {
    /// Photometric files; each is studied independently. None = reflectance estimate only
    files: Vec<PathBuf>,

    /// Parser used for the files
    #[arg(long, value_enum, default_value_t)]
    mode: ParseMode,

    /// How to repair a candela count that disagrees with the declared grid
    #[arg(long, value_enum, default_value_t)]
    resync: Resync,

    /// Fall back to a "<n> lm" annotation when the header declares no flux
    #[arg(long)]
    annotated_flux: bool,

    /// Room length in meters
    #[arg(short = 'L', long, default_value_t = 4.0)]
    length: f64,

    /// Room width in meters
    #[arg(short = 'W', long, default_value_t = 4.0)]
    width: f64,

    /// Luminaire mounting height in meters
    #[arg(long, default_value_t = 3.0)]
    mounting_height: f64,

    /// Working plane height in meters
    #[arg(long, default_value_t = 0.8)]
    work_plane: f64,

    /// Ceiling reflectance (0-1)
    #[arg(long, default_value_t = 0.7)]
    ceiling: f64,

    /// Wall reflectance (0-1)
    #[arg(long, default_value_t = 0.5)]
    walls: f64,

    /// Floor reflectance (0-1)
    #[arg(long, default_value_t = 0.2)]
    floor: f64,

    /// Rated flux of one luminaire in lumens
    #[arg(short, long, default_value_t = 1200.0)]
    flux: f64,

    /// Flux the measured coefficient is relative to (default: file's declared flux)
    #[arg(long)]
    coefficient_flux: Option<f64>,

    /// Task area preset for the target illuminance
    #[arg(short, long, value_enum, default_value_t)]
    area: Area,

    /// Explicit target illuminance in lux (overrides --area)
    #[arg(short, long)]
    target_lux: Option<f64>,

    /// Maintenance category (1 = I ... 6 = VI)
    #[arg(long, default_value_t = 1)]
    category: u8,

    /// Atmosphere (1 = very clean ... 5 = very dirty)
    #[arg(long, default_value_t = 2)]
    condition: u8,

    /// Months in service
    #[arg(short, long, default_value_t = 0.0)]
    months: f64,

    /// Extra luminaire counts to evaluate
    #[arg(long, value_delimiter = ',')]
    trial: Vec<u32>,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn study(&self) -> anyhow::Result<LightingStudy> {
        let maintenance = MaintenanceSelection {
            category: MaintenanceCategory::try_from(self.category)?,
            condition: AtmosphereCondition::try_from(self.condition)?,
            months_in_service: Months::new(self.months),
        };
        let work_area = match self.target_lux {
            Some(lux) => WorkArea::Custom(Lux::new(lux)),
            None => self.area.into(),
        };

        Ok(LightingStudy {
            room: RoomGeometry::new(
                Meters::new(self.length),
                Meters::new(self.width),
                Meters::new(self.mounting_height),
                Meters::new(self.work_plane),
            ),
            reflectances: SurfaceReflectances::new(self.ceiling, self.walls, self.floor),
            work_area,
            luminaire_flux: Lumens::new(self.flux),
            maintenance,
            coefficient_flux: self.coefficient_flux.map(Lumens::new),
        })
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            resync: self.resync.into(),
            flux_source: if self.annotated_flux {
                FluxSource::HeaderOrAnnotation
            } else {
                FluxSource::Header
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct PhotometrySummary {
    planes: usize,
    angles: usize,
    declared_flux: Lumens,
    resynchronization: Option<Resynchronization>,
}

#[derive(Debug, Serialize)]
struct FileReport {
    source: String,
    photometry: Option<PhotometrySummary>,
    report: StudyReport,
    trials: Vec<(u32, Lux)>,
}

fn load_table(path: &Path, args: &Args) -> anyhow::Result<PhotometricTable> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let table = match args.mode {
        ParseMode::Structured => parse_with(&bytes, args.parse_options()),
        ParseMode::Heuristic => parse_heuristic(&bytes).and_then(|profile| {
            let flux = args.coefficient_flux.unwrap_or(args.flux);
            profile.into_table(Lumens::new(flux))
        }),
    };
    table.with_context(|| format!("parsing {}", path.display()))
}

fn run_one(
    source: String,
    table: Option<&PhotometricTable>,
    study: &LightingStudy,
    trials: &[u32],
) -> anyhow::Result<FileReport> {
    let report = study
        .run(table)
        .with_context(|| format!("sizing for {source}"))?;
    let photometry = table.map(|t| PhotometrySummary {
        planes: t.plane_count(),
        angles: t.angle_count(),
        declared_flux: t.declared_total_flux(),
        resynchronization: t.resynchronization(),
    });
    let trials = trials
        .iter()
        .map(|&n| (n, report.illuminance_for(n)))
        .collect();

    Ok(FileReport {
        source,
        photometry,
        report,
        trials,
    })
}

fn print_report(file: &FileReport) {
    let r = &file.report;
    println!("=== {} ===", file.source);
    if let Some(p) = &file.photometry {
        println!(
            "Photometry: {} planes x {} angles, declared {}",
            p.planes, p.angles, p.declared_flux
        );
        if let Some(resync) = p.resynchronization {
            println!(
                "  grid resynchronized: declared {}x{}, used {}x{}",
                resync.declared.0, resync.declared.1, resync.resolved.0, resync.resolved.1
            );
        }
    }
    println!("Area:              {}", r.area);
    println!("Effective height:  {}", r.effective_height);
    println!("Room cavity ratio: {:.2}", r.room_cavity_ratio_display);
    println!("Estimated CU:      {:.4}", r.estimated_coefficient);
    if let Some(measured) = r.measured {
        println!(
            "Measured CU:       {:.4} ({} useful of {})",
            measured.coefficient, measured.useful_flux, measured.total_flux
        );
        if measured.exceeds_unity() {
            println!("  warning: coefficient above 1, check the declared flux");
        }
    }
    if let Some(check) = r.estimate_check {
        if let Some(rel) = check.coefficients.relative_difference {
            println!("  measured vs estimate: {:+.1}%", rel * 100.0);
        }
        if let Some(n) = check.estimated_count {
            println!("  estimate alone would need {n} luminaires");
        }
    }
    println!("Maintenance factor: {:.4}", r.maintenance_factor);
    println!("Target:            {}", r.target);
    println!(
        "Luminaires:        {} (achieving {})",
        r.required_count(),
        r.sizing.achieved
    );
    for (n, lux) in &file.trials {
        println!("  with {n:>3}: {lux}");
    }
    println!();
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let study = args.study()?;

    let results: Vec<anyhow::Result<FileReport>> = if args.files.is_empty() {
        vec![run_one("room estimate".to_string(), None, &study, &args.trial)]
    } else {
        args.files
            .par_iter()
            .map(|path| {
                let table = load_table(path, &args)?;
                run_one(path.display().to_string(), Some(&table), &study, &args.trial)
            })
            .collect()
    };

    let mut failures = 0usize;
    let mut reports = Vec::new();
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(err) => {
                failures += 1;
                eprintln!("error: {err:#}");
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        reports.iter().for_each(print_report);
    }

    if failures > 0 {
        bail!("{failures} of {} inputs failed", failures + reports.len());
    }
    Ok(())
}
