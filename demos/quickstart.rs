use chrono::Utc;
use fdtime::{
    AbsoluteTime, CucCodec, JulianDateFormat, TextFormat, TimeContext, TimeScale, UnixAliasing,
};

fn main() -> fdtime::Result<()> {
    let ctx = TimeContext::embedded()?;
    let table = ctx.snapshot();

    let now = Utc::now();
    let unix_micros = now.timestamp_micros();
    let t: AbsoluteTime = table.unix_to_tai(unix_micros)?;

    for scale in TimeScale::ALL {
        let text = TextFormat::new(scale, 3)?.format(t, &table)?;
        println!("{:>4}: {text}", scale.name());
    }
    println!("TAI-UTC: {} s", table.leap_seconds(t)?);
    println!(
        "MJD(UTC): {:.8}",
        JulianDateFormat::mjd(TimeScale::Utc).to_days(t, &table)?.value()
    );
    println!(
        "Unix (posix): {} µs",
        table.tai_to_unix(t, UnixAliasing::Posix)?
    );

    let cuc = CucCodec::default().encode_with_pfield(t)?;
    let hex: Vec<String> = cuc.iter().map(|b| format!("{b:02X}")).collect();
    println!("CUC: {}", hex.join(" "));
    Ok(())
}
