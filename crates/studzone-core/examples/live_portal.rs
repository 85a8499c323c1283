use chrono::Local;
use studzone_core::{
    next_class, AttendanceScraper, MarksScraper, PortalConfig, PortalSession, TimetableScraper,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // STUDZONE_ROLL_NUMBER / STUDZONE_PASSWORD, or a .env file
    let config = PortalConfig::from_env()?;

    let mut session = PortalSession::new(config.clone())?;
    session.login().await?;
    println!("Logged in as {}\n", config.credentials.roll_number.to_uppercase());

    let mut attendance = AttendanceScraper::with_session(session);
    let records = attendance.fetch_all().await?;
    println!("Attendance ({} courses):", records.len());
    for r in records.iter() {
        println!(
            "  {:<10} {:>3}/{:<3} {:>6.2}%  bunks left: {}",
            r.course_code, r.present_hours, r.total_hours, r.attendance_percentage, r.available_bunks
        );
    }

    let mut marks = MarksScraper::new(config.clone())?;
    let ca = marks.fetch_all().await?;
    println!("\nCA marks: {} theory, {} lab", ca.theory.len(), ca.lab.len());
    for t in &ca.theory {
        let fmt = |m: Option<f64>| m.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string());
        println!("  {} {} T1={} T2={}", t.subject_code, t.subject_name, fmt(t.t1), fmt(t.t2));
    }

    let mut timetable = TimetableScraper::new(config)?;
    let entries = timetable.fetch_all().await?;
    println!("\nTimetable: {} entries", entries.len());
    match next_class(&entries, Local::now().naive_local()) {
        Some(next) => println!(
            "Next class: {} ({}) on {} at {}, in {} minutes",
            next.entry.course_code,
            next.entry.course_name,
            next.entry.day,
            next.entry.start_time.format("%H:%M"),
            next.minutes_until
        ),
        None => println!("No upcoming classes"),
    }

    attendance.close()?;
    marks.close()?;
    timetable.close()?;
    Ok(())
}
