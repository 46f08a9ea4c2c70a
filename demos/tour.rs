/*!
A walk through every way of building a `Timestamp` and every calendar
question it can answer.

Run it with `cargo run --example tour`. Named time zones are resolved
through the default database, so the output depends on either the
system's zoneinfo directory or the bundled copy of the IANA database.
Passing a zone name as the first argument changes the zone used for the
projections, e.g., `cargo run --example tour -- Asia/Kolkata`.
*/

use std::io::Write;

use anyhow::Context;
use calstamp::{tz, Timestamp, Unit};

fn main() -> anyhow::Result<()> {
    let zone =
        std::env::args().nth(1).unwrap_or_else(|| "US/Pacific".to_string());
    let db = tz::db();
    let mut out = std::io::stdout().lock();

    writeln!(out, "# parsing")?;
    for input in [
        "2021-01-01T12",
        "20180321T081500",
        "2024-06-19T15:22:45.25Z",
        "2024-06-19T15:22:45+05:30",
        "2024-11-03T01:30[America/New_York]",
    ] {
        let ts = Timestamp::parse_with(&db, input)
            .with_context(|| format!("failed to parse {input:?}"))?;
        writeln!(out, "{input:<40} => {ts:#}")?;
    }

    writeln!(out, "\n# epoch values")?;
    let ts = Timestamp::from_epoch_f64(889088900.5, Unit::Second)?;
    writeln!(out, "889088900.5 seconds => {ts}")?;
    for unit in [
        Unit::Second,
        Unit::Millisecond,
        Unit::Microsecond,
        Unit::Nanosecond,
    ] {
        let ts = Timestamp::from_epoch(1_500_000_000, unit)?;
        writeln!(out, "1500000000 ({unit:?}) => {ts}")?;
    }

    writeln!(out, "\n# epoch values in {zone}")?;
    let ts = Timestamp::from_epoch_in(5201314, Unit::Second, &zone, &db)
        .with_context(|| format!("failed to project into {zone}"))?;
    writeln!(out, "5201314 seconds => {ts:#}")?;
    let ts = Timestamp::epoch_builder(1_700_000_000_000i64)
        .unit(Unit::Millisecond)
        .tz(&zone)
        .db(&db)
        .build()?;
    writeln!(out, "1700000000000 milliseconds => {ts:#}")?;

    writeln!(out, "\n# components")?;
    let ts = Timestamp::new(2018, 3, 21)?;
    writeln!(out, "new(2018, 3, 21) => {ts}")?;
    let ts = Timestamp::new_hms(2000, 2, 29, 23, 59, 59)?;
    writeln!(out, "new_hms(2000, 2, 29, 23, 59, 59) => {ts}")?;
    let ts = Timestamp::builder(2024, 7, 4)
        .hour(9)
        .minute(30)
        .microsecond(250_000)
        .tz(&zone)
        .db(&db)
        .build()?;
    writeln!(out, "builder(2024, 7, 4) at 09:30.250 in {zone} => {ts:#}")?;
    match Timestamp::new(2021, 2, 29) {
        Ok(ts) => writeln!(out, "new(2021, 2, 29) => {ts}")?,
        Err(err) => writeln!(out, "new(2021, 2, 29) => error: {err}")?,
    }

    writeln!(out, "\n# calendar queries")?;
    for ts in [
        Timestamp::new(2018, 3, 21)?,
        Timestamp::new(2000, 1, 1)?,
        Timestamp::new(2000, 4, 1)?,
        Timestamp::new(2024, 12, 31)?,
        Timestamp::new(2021, 1, 3)?,
    ] {
        let week = ts.iso_week_date();
        writeln!(
            out,
            "{date}: {weekday:?} (day_of_week={dow}), day {doy} of {diy}, \
             ISO week {iso_year}-W{iso_week:02}, Q{quarter}, \
             {dim} days in month, leap={leap}",
            date = ts.date(),
            weekday = ts.weekday(),
            dow = ts.day_of_week(),
            doy = ts.day_of_year(),
            diy = ts.days_in_year(),
            iso_year = week.year(),
            iso_week = week.week(),
            quarter = ts.quarter(),
            dim = ts.days_in_month(),
            leap = ts.is_leap_year(),
        )?;
        writeln!(
            out,
            "    starts: month={} quarter={} year={}; \
             ends: month={} quarter={} year={}",
            ts.is_month_start(),
            ts.is_quarter_start(),
            ts.is_year_start(),
            ts.is_month_end(),
            ts.is_quarter_end(),
            ts.is_year_end(),
        )?;
    }

    writeln!(out, "\n# back to epoch values")?;
    let ts = Timestamp::parse("2024-06-19T15:22:45.123456789Z")?;
    writeln!(
        out,
        "{ts}: s={} ms={} us={} ns={}",
        ts.as_second(),
        ts.as_millisecond(),
        ts.as_microsecond(),
        ts.as_nanosecond(),
    )?;
    Ok(())
}
