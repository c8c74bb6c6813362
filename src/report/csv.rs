use crate::register::MethodTotal;
use crate::report::recap::{MonthlyRecapRow, WeeklyRecapRow};

pub const BOM: &str = "\u{feff}";

const DAY_HEADERS: [&str; 7] = ["Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche"];

pub fn format_hours(hours: f64) -> String {
    format!("{:.2}", hours)
}

pub fn format_euros(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{}{}.{:02}€", sign, cents / 100, cents % 100)
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row<I, T>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let line: Vec<String> = fields.into_iter().map(|f| escape_field(f.as_ref())).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

pub fn weekly_recap_csv(rows: &[WeeklyRecapRow]) -> String {
    let mut out = String::from(BOM);

    let mut header = vec!["Boutique", "Employé", "Semaine"];
    header.extend(DAY_HEADERS);
    header.push("Total");
    push_row(&mut out, header);

    for row in rows {
        let mut fields = vec![row.shop_name.clone(), row.employee_name.clone(), row.week.to_string()];
        fields.extend(row.day_hours.iter().map(|h| format_hours(*h)));
        fields.push(format_hours(row.total_hours));
        push_row(&mut out, fields);
    }
    out
}

pub fn monthly_recap_csv(rows: &[MonthlyRecapRow]) -> String {
    let mut out = String::from(BOM);
    push_row(
        &mut out,
        ["Boutique", "Employé", "Semaine", "Fragmentée", "Déjà payé", "Heures du mois", "Reporté"],
    );

    for row in rows {
        for segment in &row.segments {
            push_row(
                &mut out,
                [
                    row.shop_name.clone(),
                    row.employee_name.clone(),
                    segment.week.to_string(),
                    if segment.fragmented { "oui" } else { "non" }.to_string(),
                    format_hours(segment.split.before),
                    format_hours(segment.split.within),
                    format_hours(segment.split.after),
                ],
            );
        }
        push_row(
            &mut out,
            [
                row.shop_name.clone(),
                row.employee_name.clone(),
                "Total".to_string(),
                String::new(),
                format_hours(row.already_paid_hours()),
                format_hours(row.total_hours),
                format_hours(row.deferred_hours()),
            ],
        );
    }
    out
}

pub fn payment_totals_csv(totals: &[MethodTotal]) -> String {
    let mut out = String::from(BOM);
    push_row(&mut out, ["Moyen de paiement", "Nombre", "Total"]);

    let mut grand_total = 0;
    for total in totals {
        grand_total += total.total_cents;
        push_row(
            &mut out,
            [
                total.method.label().to_string(),
                total.count.to_string(),
                format_euros(total.total_cents),
            ],
        );
    }
    push_row(&mut out, ["Total".to_string(), String::new(), format_euros(grand_total)]);
    out
}
