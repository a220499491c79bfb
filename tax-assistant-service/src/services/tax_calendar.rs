//! Filing calendar and thresholds for the personal income tax return
//! (tax year 2024, filed during 2025).

use chrono::{Datelike, NaiveDate};

/// Tax year the thresholds apply to.
pub const TAX_YEAR: i32 = 2024;

/// Calendar year in which the return is filed.
pub const FILING_YEAR: i32 = 2025;

/// UVT value for the tax year, in COP.
pub const UVT_TAX_YEAR: u64 = 47_065;

/// UVT value for the filing year, in COP.
pub const UVT_FILING_YEAR: u64 = 49_799;

/// A filing obligation is triggered when any of these is exceeded.
#[derive(Debug, Clone, Copy)]
pub struct Threshold {
    pub label: &'static str,
    pub uvt: u64,
}

impl Threshold {
    pub fn cop(&self) -> u64 {
        self.uvt * UVT_TAX_YEAR
    }
}

pub const THRESHOLDS: &[Threshold] = &[
    Threshold {
        label: "Patrimonio bruto al 31 de diciembre",
        uvt: 4_500,
    },
    Threshold {
        label: "Ingresos brutos del año",
        uvt: 1_400,
    },
    Threshold {
        label: "Consumos con tarjeta de crédito",
        uvt: 1_400,
    },
    Threshold {
        label: "Compras y consumos totales",
        uvt: 1_400,
    },
    Threshold {
        label: "Consignaciones, depósitos o inversiones financieras",
        uvt: 1_400,
    },
];

/// Range of ID suffixes (last two digits) sharing one deadline.
/// Suffix `00` is stored as 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineBracket {
    pub first: u8,
    pub last: u8,
    month: u32,
    day: u32,
}

const fn bracket(first: u8, last: u8, month: u32, day: u32) -> DeadlineBracket {
    DeadlineBracket {
        first,
        last,
        month,
        day,
    }
}

pub const DEADLINES: &[DeadlineBracket] = &[
    bracket(1, 2, 8, 12),
    bracket(3, 4, 8, 13),
    bracket(5, 6, 8, 14),
    bracket(7, 8, 8, 15),
    bracket(9, 10, 8, 19),
    bracket(11, 12, 8, 20),
    bracket(13, 14, 8, 21),
    bracket(15, 16, 8, 22),
    bracket(17, 18, 8, 25),
    bracket(19, 20, 8, 26),
    bracket(21, 22, 8, 27),
    bracket(23, 24, 8, 28),
    bracket(25, 26, 8, 29),
    bracket(27, 28, 9, 1),
    bracket(29, 30, 9, 2),
    bracket(31, 32, 9, 3),
    bracket(33, 34, 9, 4),
    bracket(35, 36, 9, 5),
    bracket(37, 38, 9, 8),
    bracket(39, 40, 9, 9),
    bracket(41, 42, 9, 10),
    bracket(43, 44, 9, 11),
    bracket(45, 46, 9, 12),
    bracket(47, 48, 9, 15),
    bracket(49, 50, 9, 16),
    bracket(51, 52, 9, 17),
    bracket(53, 54, 9, 18),
    bracket(55, 56, 9, 19),
    bracket(57, 58, 9, 22),
    bracket(59, 60, 9, 23),
    bracket(61, 62, 9, 24),
    bracket(63, 64, 9, 25),
    bracket(65, 66, 9, 26),
    bracket(67, 68, 9, 29),
    bracket(69, 70, 9, 30),
    bracket(71, 72, 10, 1),
    bracket(73, 74, 10, 2),
    bracket(75, 76, 10, 3),
    bracket(77, 78, 10, 6),
    bracket(79, 80, 10, 7),
    bracket(81, 82, 10, 8),
    bracket(83, 84, 10, 9),
    bracket(85, 86, 10, 10),
    bracket(87, 88, 10, 14),
    bracket(89, 90, 10, 15),
    bracket(91, 92, 10, 16),
    bracket(93, 94, 10, 17),
    bracket(95, 96, 10, 20),
    bracket(97, 98, 10, 21),
    bracket(99, 100, 10, 22),
];

impl DeadlineBracket {
    /// Filing deadline; `None` only if the table holds an impossible date.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(FILING_YEAR, self.month, self.day)
    }

    /// Suffix range as written on the official calendar, e.g. `99-00`.
    pub fn suffix_label(&self) -> String {
        format!("{:02}-{:02}", self.first % 100, self.last % 100)
    }
}

/// Date in long Spanish form, e.g. `15 de agosto de 2025`.
pub fn spanish_date(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        spanish_month(date.month()),
        date.year()
    )
}

/// Formats an amount in COP with `.` thousands separators.
pub fn format_cop(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

fn spanish_month(month: u32) -> &'static str {
    match month {
        1 => "enero",
        2 => "febrero",
        3 => "marzo",
        4 => "abril",
        5 => "mayo",
        6 => "junio",
        7 => "julio",
        8 => "agosto",
        9 => "septiembre",
        10 => "octubre",
        11 => "noviembre",
        _ => "diciembre",
    }
}
