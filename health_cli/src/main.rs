use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use health_core::export::{export_bp_readings, export_heart_rate};
use health_core::validate::*;
use health_core::views::*;
use health_core::*;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "htrack")]
#[command(about = "Personal health tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Track daily water intake
    Water {
        #[command(subcommand)]
        action: WaterAction,
    },

    /// Record blood pressure readings
    Bp {
        #[command(subcommand)]
        action: BpAction,
    },

    /// Record heart rate readings
    Hr {
        #[command(subcommand)]
        action: HrAction,
    },

    /// Manage doctor's appointments
    Appt {
        #[command(subcommand)]
        action: ApptAction,
    },

    /// Manage your doctors
    Doctor {
        #[command(subcommand)]
        action: DoctorAction,
    },

    /// Medication reminders
    Med {
        #[command(subcommand)]
        action: MedAction,
    },

    /// Emergency contacts
    Contact {
        #[command(subcommand)]
        action: ContactAction,
    },

    /// Start the emergency alarm countdown (press Enter to cancel)
    Alarm {
        /// Countdown length, defaults to the configured value
        #[arg(long)]
        seconds: Option<u32>,
    },

    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },

    /// Log in as the demo user
    Demo,

    /// Forget the stored login
    Logout,

    /// Show who is logged in
    Whoami,
}

#[derive(Subcommand)]
enum WaterAction {
    /// Add glasses of water (default one glass)
    Add {
        #[arg(default_value_t = 1.0)]
        amount: f64,
    },
    /// Take back one glass
    Remove,
    /// Reset today's intake
    Reset,
    /// Set the daily goal in glasses (1-15)
    Goal { goal: i64 },
    /// Show today's intake
    Status,
}

#[derive(Subcommand)]
enum BpAction {
    /// Add a reading
    Add {
        #[arg(long, default_value = "")]
        systolic: String,
        #[arg(long, default_value = "")]
        diastolic: String,
        #[arg(long, default_value = "")]
        pulse: String,
    },
    /// List readings, newest first
    List,
    /// Delete a reading
    Delete { id: RecordId },
    /// Export readings to CSV
    Export { path: PathBuf },
}

#[derive(Subcommand)]
enum HrAction {
    /// Add a reading in BPM
    Add {
        #[arg(default_value = "")]
        value: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List readings with the average, newest first
    List,
    /// Delete a reading
    Delete { id: RecordId },
    /// Export readings to CSV
    Export { path: PathBuf },
}

#[derive(Subcommand)]
enum ApptAction {
    /// Schedule an appointment
    Add {
        #[arg(long, default_value = "")]
        doctor: String,
        /// YYYY-MM-DD
        #[arg(long, default_value = "")]
        date: String,
        /// HH:MM
        #[arg(long, default_value = "")]
        time: String,
        #[arg(long, default_value = "")]
        purpose: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List upcoming and past appointments
    List,
    /// Delete an appointment
    Delete { id: RecordId },
}

#[derive(Subcommand)]
enum DoctorAction {
    /// Add a doctor
    Add {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        specialty: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List doctors, optionally filtered by name or specialty
    List {
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Delete a doctor
    Delete { id: RecordId },
}

#[derive(Subcommand)]
enum MedAction {
    /// Add a medication reminder
    Add {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        dosage: String,
        /// daily, twice-daily, weekly, monthly or as-needed
        #[arg(long, default_value = "daily")]
        frequency: Frequency,
        /// HH:MM, optional for as-needed medications
        #[arg(long, default_value = "")]
        time: String,
        /// YYYY-MM-DD, defaults to today
        #[arg(long, default_value = "")]
        start_date: String,
        #[arg(long, default_value = "")]
        end_date: String,
        #[arg(long, default_value = "")]
        instructions: String,
        #[arg(long)]
        with_food: bool,
        #[arg(long)]
        without_water: bool,
    },
    /// List all medications
    List,
    /// Medications to take today
    Today,
    /// Toggle whether a medication has been taken
    Take { id: RecordId },
    /// Delete a medication
    Delete { id: RecordId },
}

#[derive(Subcommand)]
enum ContactAction {
    /// Add an emergency contact
    Add {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    /// List emergency contacts
    List,
    /// Delete an emergency contact
    Delete { id: RecordId },
}

fn main() -> ExitCode {
    // Initialize logging
    health_core::logging::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);
    let storage = FileStorage::new(data_dir);

    match cli.command {
        Commands::Water { action } => cmd_water(&storage, &config, action),
        Commands::Bp { action } => cmd_bp(&storage, action),
        Commands::Hr { action } => cmd_hr(&storage, action),
        Commands::Appt { action } => cmd_appt(&storage, action),
        Commands::Doctor { action } => cmd_doctor(&storage, action),
        Commands::Med { action } => cmd_med(&storage, action),
        Commands::Contact { action } => cmd_contact(&storage, action),
        Commands::Alarm { seconds } => {
            cmd_alarm(&storage, seconds.unwrap_or(config.alarm.countdown_seconds))
        }
        Commands::Login { email, password } => {
            let response = MockAuth.login(&email, &password)?;
            Session::new(&storage).save(&response.token)?;
            println!("✓ Logged in as {}", response.user.name);
            Ok(())
        }
        Commands::Register {
            name,
            email,
            password,
        } => {
            let response = MockAuth.register(&name, &email, &password, Utc::now())?;
            Session::new(&storage).save(&response.token)?;
            println!("✓ Registered and logged in as {}", response.user.name);
            Ok(())
        }
        Commands::Demo => {
            let response = MockAuth.demo();
            Session::new(&storage).save(&response.token)?;
            println!("✓ Logged in as {}", response.user.name);
            Ok(())
        }
        Commands::Logout => {
            Session::new(&storage).clear()?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => cmd_whoami(&storage),
    }
}

fn cmd_water(storage: &FileStorage, config: &Config, action: WaterAction) -> Result<()> {
    let mut tracker = WaterTracker::open(
        storage,
        config.water.max_glasses,
        config.water.default_goal,
    )?;

    match action {
        WaterAction::Add { amount } => {
            tracker.add(amount)?;
            println!("✓ Added {} glass(es)", amount);
        }
        WaterAction::Remove => {
            if tracker.log().total <= 0.0 {
                println!("Nothing to remove");
            } else {
                tracker.remove_glass()?;
                println!("✓ Removed 1 glass");
            }
        }
        WaterAction::Reset => {
            tracker.reset()?;
            println!("✓ Water intake reset");
        }
        WaterAction::Goal { goal } => {
            let goal = tracker.set_goal(goal)?;
            println!("✓ Daily goal set to {} glasses", goal);
        }
        WaterAction::Status => {}
    }

    display_water(tracker.log());
    Ok(())
}

fn cmd_bp(storage: &FileStorage, action: BpAction) -> Result<()> {
    let mut store = RecordStore::<BpReading, _>::open(storage)?;

    match action {
        BpAction::Add {
            systolic,
            diastolic,
            pulse,
        } => {
            let reading = validate_bp(&BpInput {
                systolic,
                diastolic,
                pulse,
            })?;
            let classification = classify_bp(&reading);
            store.add(reading.clone())?;

            println!(
                "✓ Reading saved: {}/{} ({})",
                reading.systolic, reading.diastolic, classification.label
            );
            if classification.alert() {
                print_crisis_warning();
            }
        }
        BpAction::List => {
            if store.is_empty() {
                println!("No readings recorded yet");
            }
            for record in store.records().iter().rev() {
                let reading = &record.fields;
                let classification = classify_bp(reading);
                let pulse = reading
                    .pulse
                    .map(|p| format!(" ({} BPM)", p))
                    .unwrap_or_default();
                println!(
                    "{:>14}  {}  {}/{}{}  {}",
                    record.id,
                    local_time(&record.created_at),
                    reading.systolic,
                    reading.diastolic,
                    pulse,
                    classification.label
                );
                if classification.alert() {
                    print_crisis_warning();
                }
            }
        }
        BpAction::Delete { id } => print_removed(store.remove(id)?, id),
        BpAction::Export { path } => {
            let count = export_bp_readings(store.records(), &path)?;
            print_exported(count, &path);
        }
    }

    Ok(())
}

fn cmd_hr(storage: &FileStorage, action: HrAction) -> Result<()> {
    let mut store = RecordStore::<HeartRateReading, _>::open(storage)?;

    match action {
        HrAction::Add { value, notes } => {
            let reading = validate_heart_rate(&HeartRateInput { value, notes })?;
            let classification = classify_heart_rate(&reading);
            store.add(reading.clone())?;
            println!(
                "✓ Heart rate saved: {} BPM ({})",
                reading.value, classification.label
            );
        }
        HrAction::List => {
            println!("Average: {} BPM", average_heart_rate(store.records()));
            if store.is_empty() {
                println!("No readings recorded yet");
            }
            for record in store.records().iter().rev() {
                let notes = record
                    .fields
                    .notes
                    .as_deref()
                    .map(|n| format!("  {}", n))
                    .unwrap_or_default();
                println!(
                    "{:>14}  {}  {} BPM  {}{}",
                    record.id,
                    local_time(&record.created_at),
                    record.fields.value,
                    classify_heart_rate(&record.fields).label,
                    notes
                );
            }
        }
        HrAction::Delete { id } => print_removed(store.remove(id)?, id),
        HrAction::Export { path } => {
            let count = export_heart_rate(store.records(), &path)?;
            print_exported(count, &path);
        }
    }

    Ok(())
}

fn cmd_appt(storage: &FileStorage, action: ApptAction) -> Result<()> {
    let mut store = RecordStore::<Appointment, _>::open(storage)?;

    match action {
        ApptAction::Add {
            doctor,
            date,
            time,
            purpose,
            location,
            notes,
        } => {
            let appointment = validate_appointment(&AppointmentInput {
                doctor_name: doctor,
                purpose,
                location,
                notes,
                date,
                time,
            })?;
            let when = appointment.timestamp();
            let name = appointment.doctor_name.clone();
            store.add(appointment)?;
            println!(
                "✓ Appointment with {} on {}",
                name,
                when.format("%Y-%m-%d at %H:%M")
            );
        }
        ApptAction::List => {
            let schedule = partition_appointments(store.records(), Local::now().naive_local());

            println!("Upcoming appointments:");
            if schedule.upcoming.is_empty() {
                println!("  No upcoming appointments");
            }
            for record in &schedule.upcoming {
                display_appointment(record);
            }

            if !schedule.past.is_empty() {
                println!();
                println!("Past appointments:");
                for record in &schedule.past {
                    display_appointment(record);
                }
            }
        }
        ApptAction::Delete { id } => print_removed(store.remove(id)?, id),
    }

    Ok(())
}

fn cmd_doctor(storage: &FileStorage, action: DoctorAction) -> Result<()> {
    let mut store = RecordStore::<Doctor, _>::open(storage)?;

    match action {
        DoctorAction::Add {
            name,
            specialty,
            phone,
            email,
            address,
            notes,
        } => {
            let doctor = validate_doctor(&DoctorInput {
                name,
                specialty,
                phone,
                email,
                address,
                notes,
            })?;
            let name = doctor.name.clone();
            store.add(doctor)?;
            println!("✓ Added {}", name);
        }
        DoctorAction::List { search } => {
            let doctors = search_doctors(store.records(), &search);
            if doctors.is_empty() {
                println!("No doctors found");
            }
            for record in doctors {
                let doctor = &record.fields;
                println!("{:>14}  {} ({})", record.id, doctor.name, doctor.specialty);
                for detail in [&doctor.phone, &doctor.email, &doctor.address, &doctor.notes]
                    .into_iter()
                    .flatten()
                {
                    println!("{:>16}{}", "", detail);
                }
            }
        }
        DoctorAction::Delete { id } => print_removed(store.remove(id)?, id),
    }

    Ok(())
}

fn cmd_med(storage: &FileStorage, action: MedAction) -> Result<()> {
    let mut store = RecordStore::<Medication, _>::open(storage)?;

    match action {
        MedAction::Add {
            name,
            dosage,
            frequency,
            time,
            start_date,
            end_date,
            instructions,
            with_food,
            without_water,
        } => {
            let input = MedicationInput {
                name,
                dosage,
                frequency,
                time,
                start_date,
                end_date,
                instructions,
                with_food,
                with_water: !without_water,
            };
            let medication = validate_medication(&input, Local::now().date_naive())?;
            let name = medication.name.clone();
            store.add(medication)?;
            println!("✓ Added {}", name);
        }
        MedAction::List => {
            if store.is_empty() {
                println!("No medications added yet");
            }
            for record in store.records() {
                display_medication(record);
            }
        }
        MedAction::Today => {
            let due = due_today(store.records());
            if due.is_empty() {
                println!("No medications scheduled for today");
            }
            for record in due {
                display_medication(record);
            }
        }
        MedAction::Take { id } => match store.toggle_taken(id)? {
            Some(true) => println!("✓ Marked as taken"),
            Some(false) => println!("Marked as not taken"),
            None => println!("No medication with id {}", id),
        },
        MedAction::Delete { id } => print_removed(store.remove(id)?, id),
    }

    Ok(())
}

fn cmd_contact(storage: &FileStorage, action: ContactAction) -> Result<()> {
    let mut store = RecordStore::<EmergencyContact, _>::open(storage)?;

    match action {
        ContactAction::Add { name, phone } => {
            let contact = validate_contact(&ContactInput { name, phone })?;
            let name = contact.name.clone();
            store.add(contact)?;
            println!("✓ Added {}", name);
        }
        ContactAction::List => {
            if store.is_empty() {
                println!("No emergency contacts");
            }
            for record in store.records() {
                println!(
                    "{:>14}  {}  {}",
                    record.id, record.fields.name, record.fields.phone
                );
            }
        }
        ContactAction::Delete { id } => print_removed(store.remove(id)?, id),
    }

    Ok(())
}

fn cmd_alarm(storage: &FileStorage, seconds: u32) -> Result<()> {
    let contacts: Vec<EmergencyContact> = RecordStore::<EmergencyContact, _>::open(storage)?
        .records()
        .iter()
        .map(|r| r.fields.clone())
        .collect();

    println!("╭─────────────────────────────────────────╮");
    println!("│  EMERGENCY ALARM ACTIVE                 │");
    println!("╰─────────────────────────────────────────╯");
    println!(
        "Emergency contacts will be notified in {} seconds. Press Enter to cancel.",
        seconds
    );

    let mut alarm = AlarmController::new(seconds);
    alarm.start(move || {
        println!();
        println!("Notifying emergency contacts:");
        if contacts.is_empty() {
            println!("  (no emergency contacts configured)");
        }
        for contact in &contacts {
            println!("  → {} ({})", contact.name, contact.phone);
        }
    });

    // A line on stdin cancels; end of input just lets the countdown run
    let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
    thread::spawn(move || {
        let mut line = String::new();
        if matches!(io::stdin().read_line(&mut line), Ok(n) if n > 0) {
            let _ = cancel_tx.send(());
        }
    });

    loop {
        if alarm.state() == AlarmState::Triggered {
            break;
        }
        match cancel_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(()) => {
                if alarm.state() != AlarmState::Triggered {
                    alarm.cancel();
                    println!("Alarm cancelled, no one was notified");
                    return Ok(());
                }
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    alarm.wait();

    if alarm.state() == AlarmState::Triggered {
        println!("\n✓ Emergency contacts notified");
    }
    Ok(())
}

fn cmd_whoami(storage: &FileStorage) -> Result<()> {
    match Session::new(storage).current_user(&MockAuth)? {
        Some(user) => println!("Logged in as {} <{}>", user.name, user.email),
        None => println!("Not logged in"),
    }
    Ok(())
}

fn display_water(log: &WaterLog) {
    println!(
        "Water: {} / {} glasses ({}% of daily goal)",
        log.total,
        log.goal,
        water_progress(log.total, log.goal)
    );
    for entry in &log.history {
        println!("  {}  +{}", entry.time, entry.amount);
    }
}

fn display_appointment(record: &Record<Appointment>) {
    let appointment = &record.fields;
    let mut line = format!(
        "{:>14}  {}  {}",
        record.id,
        appointment.timestamp().format("%Y-%m-%d %H:%M"),
        appointment.doctor_name
    );
    if let Some(ref purpose) = appointment.purpose {
        line.push_str(&format!(" | {}", purpose));
    }
    if let Some(ref location) = appointment.location {
        line.push_str(&format!(" @ {}", location));
    }
    println!("{}", line);
    if let Some(ref notes) = appointment.notes {
        println!("{:>16}{}", "", notes);
    }
}

fn display_medication(record: &Record<Medication>) {
    let medication = &record.fields;
    let mark = if medication.taken { "[x]" } else { "[ ]" };
    let time = medication
        .time
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "any time".into());
    let dosage = medication.dosage.as_deref().unwrap_or("");

    println!(
        "{:>14}  {} {} {}  {}, {}",
        record.id, mark, medication.name, dosage, medication.frequency, time
    );

    let mut notes = Vec::new();
    if medication.with_food {
        notes.push("with food".to_string());
    }
    if medication.with_water {
        notes.push("with water".to_string());
    }
    if let Some(ref instructions) = medication.instructions {
        notes.push(instructions.clone());
    }
    if !notes.is_empty() {
        println!("{:>16}{}", "", notes.join("; "));
    }
}

fn print_crisis_warning() {
    println!(
        "  ⚠ This reading indicates a hypertensive crisis. \
         Consult a doctor immediately if you experience symptoms."
    );
}

fn print_removed(removed: bool, id: RecordId) {
    if removed {
        println!("✓ Deleted {}", id);
    } else {
        println!("No record with id {}", id);
    }
}

fn print_exported(count: usize, path: &Path) {
    println!("✓ Exported {} readings", count);
    println!("  CSV: {}", path.display());
}

fn local_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
