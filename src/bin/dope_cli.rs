use clap::{Args, Parser, Subcommand, ValueEnum};
use dope_ballistics::{
    compute_air_density, dope_table_with_config, solve_trajectory_with_config,
    suggest_scope_correction, zero_angle, AngularUnit, BallisticsError, DragModel, Environment,
    FiringSolution, Hold, ImpactOffset, Integrator, ProjectileSpec, SolverConfig, TrajectoryResult,
};
use std::error::Error;
use std::path::PathBuf;

/// Largest range ladder the `dope` subcommand will build
const MAX_LADDER_ROWS: usize = 10_000;

#[derive(Parser)]
#[command(name = "dope-cli")]
#[command(version)]
#[command(about = "Point-mass ballistics solver and DOPE card generator", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single shot
    Solve {
        #[command(flatten)]
        shot: ShotArgs,

        /// Target range (m)
        #[arg(short = 'r', long)]
        range: f64,

        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Build a DOPE card over a range ladder
    Dope {
        #[command(flatten)]
        shot: ShotArgs,

        /// First range (m)
        #[arg(long, default_value = "100")]
        start: f64,

        /// Last range (m)
        #[arg(long, default_value = "1000")]
        end: f64,

        /// Range increment (m)
        #[arg(long, default_value = "100")]
        step: f64,

        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Turn an observed point-of-impact offset into a dial correction
    Correct {
        /// Range the group was shot at (m)
        #[arg(short = 'r', long)]
        range: f64,

        /// Group offset, positive high (cm)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        up_cm: f64,

        /// Group offset, positive right (cm)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        right_cm: f64,

        /// Predicted elevation hold (mil)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        hold_up_mil: f64,

        /// Predicted windage hold (mil)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        hold_right_mil: f64,

        /// mil or moa
        #[arg(short = 'u', long, default_value = "mil")]
        unit: String,

        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Air density for a set of conditions
    Density {
        #[command(flatten)]
        atmosphere: AtmosphereArgs,

        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Display solver information
    Info,
}

#[derive(Args)]
struct ShotArgs {
    /// Muzzle velocity (m/s)
    #[arg(long)]
    velocity: f64,

    /// Ballistic coefficient (lb/in²)
    #[arg(short = 'b', long, default_value = "0.5")]
    bc: f64,

    /// Drag model (g1, g7, none)
    #[arg(long, default_value = "g1")]
    drag_model: String,

    /// Bullet mass (g)
    #[arg(short = 'm', long, default_value = "10.9")]
    mass: f64,

    /// Bullet diameter (mm)
    #[arg(short = 'd', long, default_value = "7.82")]
    diameter: f64,

    /// Extra elevation above the zero (degrees)
    #[arg(short = 'a', long, default_value = "0.0", allow_hyphen_values = true)]
    angle: f64,

    /// Sight height over bore (m)
    #[arg(long, default_value = "0.05")]
    sight_height: f64,

    /// Zero distance (m); 0 fires from the bore line without zeroing
    #[arg(short = 'z', long, default_value = "100.0")]
    zero: f64,

    /// Wind speed (m/s)
    #[arg(long, default_value = "0.0")]
    wind_speed: f64,

    /// Wind direction (degrees, 0 = headwind, 90 = from the left)
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    wind_direction: f64,

    #[command(flatten)]
    atmosphere: AtmosphereArgs,

    /// Solver configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Integrator override (euler, midpoint, rk4)
    #[arg(long)]
    integrator: Option<String>,
}

#[derive(Args)]
struct AtmosphereArgs {
    /// Temperature (Celsius)
    #[arg(long, default_value = "15.0", allow_hyphen_values = true)]
    temperature: f64,

    /// Station pressure (hPa)
    #[arg(long, default_value = "1013.25")]
    pressure: f64,

    /// Relative humidity (0-100)
    #[arg(long, default_value = "50.0")]
    humidity: f64,

    /// Use ICAO standard temperature and pressure at this altitude (m)
    #[arg(long)]
    altitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Table,
}

impl AtmosphereArgs {
    fn environment(&self) -> Environment {
        match self.altitude {
            Some(alt) => Environment::icao_at_altitude(alt, self.humidity),
            None => Environment::new(self.temperature, self.pressure, self.humidity),
        }
    }
}

impl ShotArgs {
    fn request(&self, range_m: f64) -> Result<FiringSolution, BallisticsError> {
        let drag_model = DragModel::from_str(&self.drag_model)
            .ok_or_else(|| BallisticsError::UnknownDragModel(self.drag_model.clone()))?;

        Ok(FiringSolution {
            projectile: ProjectileSpec::new(self.velocity, drag_model, self.bc, self.mass, self.diameter),
            range_m,
            launch_angle_deg: self.angle,
            height_over_bore_m: self.sight_height,
            zero_distance_m: self.zero,
            environment: self.atmosphere.environment(),
            wind_speed_ms: self.wind_speed,
            wind_direction_deg: self.wind_direction,
        })
    }

    fn solver_config(&self) -> Result<SolverConfig, BallisticsError> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::from_path(path)?,
            None => SolverConfig::default(),
        };
        if let Some(name) = &self.integrator {
            config.integrator = Integrator::from_str(name)
                .ok_or_else(|| BallisticsError::Config(format!("unknown integrator '{name}'")))?;
        }
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve { shot, range, output } => {
            let request = shot.request(range)?;
            let config = shot.solver_config()?;
            let result = solve_trajectory_with_config(&request, &config)?;
            display_solution(&result, output)?;
        }

        Commands::Dope { shot, start, end, step, output } => {
            if !(step > 0.0) || !(end >= start) {
                return Err("range ladder needs step > 0 and end >= start".into());
            }
            let request = shot.request(start)?;
            let config = shot.solver_config()?;

            let count = ((end - start) / step + 1e-9).floor() + 1.0;
            if count > MAX_LADDER_ROWS as f64 {
                return Err(format!("range ladder exceeds {MAX_LADDER_ROWS} rows; use a larger step").into());
            }
            let count = count as usize;
            let ranges: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            let rows = dope_table_with_config(&request, &ranges, &config)?;

            if request.zero_distance_m > 0.0 {
                if let Some(deg) = zero_angle(&request, &config)? {
                    log::debug!("bore elevation for {} m zero: {deg:.4}°", request.zero_distance_m);
                }
            }
            display_dope(&rows, output)?;
        }

        Commands::Correct { range, up_cm, right_cm, hold_up_mil, hold_right_mil, unit, output } => {
            let unit = AngularUnit::from_str(&unit)
                .ok_or_else(|| BallisticsError::Config(format!("unknown angular unit '{unit}'")))?;
            let correction = suggest_scope_correction(
                Hold { up_mil: hold_up_mil, right_mil: hold_right_mil },
                ImpactOffset { up_cm, right_cm },
                range,
                unit,
            )?;

            match output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&correction)?),
                OutputFormat::Csv => {
                    println!("range_m,up,right,unit");
                    println!("{:.1},{:.3},{:.3},{}", range, correction.up, correction.right, correction.unit);
                }
                OutputFormat::Table => {
                    println!("╔════════════════════════════════════════╗");
                    println!("║         SCOPE CORRECTION               ║");
                    println!("╠════════════════════════════════════════╣");
                    println!("║ Range:             {:>8.1} m          ║", range);
                    println!("║ Dial Up:           {:>8.3} {:<4}       ║", correction.up, correction.unit.to_string());
                    println!("║ Dial Right:        {:>8.3} {:<4}       ║", correction.right, correction.unit.to_string());
                    println!("╚════════════════════════════════════════╝");
                }
            }
        }

        Commands::Density { atmosphere, output } => {
            let environment = atmosphere.environment();
            environment.validate()?;
            let density = compute_air_density(&environment);

            match output {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "environment": environment,
                        "air_density_kg_m3": density,
                    }))?
                ),
                OutputFormat::Csv => {
                    println!("temperature_c,pressure_hpa,humidity_pct,air_density_kg_m3");
                    println!(
                        "{:.2},{:.2},{:.1},{:.5}",
                        environment.temperature_c, environment.pressure_hpa, environment.humidity_pct, density
                    );
                }
                OutputFormat::Table => {
                    println!("╔════════════════════════════════════════╗");
                    println!("║         AIR DENSITY                    ║");
                    println!("╠════════════════════════════════════════╣");
                    println!("║ Temperature:       {:>8.2} °C         ║", environment.temperature_c);
                    println!("║ Pressure:          {:>8.2} hPa        ║", environment.pressure_hpa);
                    println!("║ Humidity:          {:>8.1} %          ║", environment.clamped_humidity());
                    println!("║ Density:           {:>8.5} kg/m³      ║", density);
                    println!("╚════════════════════════════════════════╝");
                }
            }
        }

        Commands::Info => {
            let config = SolverConfig::default();
            println!("╔════════════════════════════════════════╗");
            println!("║      DOPE BALLISTICS v{:<8}         ║", env!("CARGO_PKG_VERSION"));
            println!("╠════════════════════════════════════════╣");
            println!("║ Point-mass trajectory solver           ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Drag models:       none, G1, G7        ║");
            println!("║ Integrator:        {:<20}║", format!("{:?}", config.integrator));
            println!("║ Time step:         {:>8.4} s          ║", config.time_step_s);
            println!("║ Speed of sound:    {:>8.1} m/s        ║", config.speed_of_sound_mps);
            println!("║ Ground floor:      {:>8.1} m          ║", config.ground_floor_m);
            println!("╚════════════════════════════════════════╝");
        }
    }

    Ok(())
}

fn display_solution(result: &TrajectoryResult, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => {
            print_csv_header();
            print_csv_row(result);
        }
        OutputFormat::Table => {
            println!("╔════════════════════════════════════════╗");
            println!("║         FIRING SOLUTION                ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Range:             {:>8.1} m          ║", result.range_m);
            println!("║ Time of Flight:    {:>8.3} s          ║", result.time_of_flight_s);
            println!("║ Impact Velocity:   {:>8.1} m/s        ║", result.impact_velocity_ms);
            println!("║ Impact Energy:     {:>8.0} J          ║", result.impact_energy_j);
            println!("║ Drop:              {:>8.3} m          ║", result.drop_m);
            println!("║ Wind Drift:        {:>8.3} m          ║", result.wind_drift_m);
            println!("╠════════════════════════════════════════╣");
            println!("║ Elevation:  {:>7.2} mil  {:>7.2} MOA   ║", result.hold_mil, result.hold_moa);
            println!("║ Windage:    {:>7.2} mil  {:>7.2} MOA   ║", result.windage_mil, result.windage_moa);
            println!("╠════════════════════════════════════════╣");
            println!("║ Air Density:       {:>8.4} kg/m³      ║", result.air_density_used);
            println!("║ Drag Model:        {:>8}            ║", result.model_used.to_string());
            println!("║ Status:  {:<30}║", result.status.to_string());
            println!("╚════════════════════════════════════════╝");
        }
    }
    Ok(())
}

fn display_dope(rows: &[TrajectoryResult], format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        OutputFormat::Csv => {
            print_csv_header();
            for row in rows {
                print_csv_row(row);
            }
        }
        OutputFormat::Table => {
            println!("┌─────────┬──────────┬──────────┬──────────┬──────────┬──────────┐");
            println!("│ Range m │  TOF s   │ Vel m/s  │  Drop m  │ Elev mil │ Wind mil │");
            println!("├─────────┼──────────┼──────────┼──────────┼──────────┼──────────┤");
            for r in rows {
                if r.status.is_valid() {
                    println!(
                        "│ {:>7.0} │ {:>8.3} │ {:>8.1} │ {:>8.3} │ {:>8.2} │ {:>8.2} │",
                        r.range_m, r.time_of_flight_s, r.impact_velocity_ms, r.drop_m, r.hold_mil, r.windage_mil
                    );
                } else {
                    println!("│ {:>7.0} │ {:<48} │", r.range_m, r.status.to_string());
                }
            }
            println!("└─────────┴──────────┴──────────┴──────────┴──────────┴──────────┘");
        }
    }
    Ok(())
}

fn print_csv_header() {
    println!("range_m,time_of_flight_s,impact_velocity_ms,drop_m,wind_drift_m,hold_mil,hold_moa,windage_mil,windage_moa,impact_energy_j,status");
}

fn print_csv_row(r: &TrajectoryResult) {
    println!(
        "{:.1},{:.4},{:.2},{:.4},{:.4},{:.3},{:.3},{:.3},{:.3},{:.1},{}",
        r.range_m,
        r.time_of_flight_s,
        r.impact_velocity_ms,
        r.drop_m,
        r.wind_drift_m,
        r.hold_mil,
        r.hold_moa,
        r.windage_mil,
        r.windage_moa,
        r.impact_energy_j,
        r.status
    );
}
