//! Dashboard aggregates. Pure functions over collections already read
//! from the store; nothing here caches or persists.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Class, DashboardStats, Grade, Student};

pub fn round_1_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Mean of per-record percentages, rounded to the nearest whole percent.
/// Defined as 0 for an empty collection.
pub fn average_grade_percent(grades: &[Grade]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }
    let total: f64 = grades.iter().map(|g| g.percent()).sum();
    (total / grades.len() as f64).round()
}

/// Unique teacher names, exact case-sensitive match.
pub fn distinct_teacher_count(classes: &[Class]) -> usize {
    let mut seen: Vec<&str> = classes.iter().map(|c| c.teacher_name.as_str()).collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

pub fn dashboard_stats(students: &[Student], classes: &[Class], grades: &[Grade]) -> DashboardStats {
    DashboardStats {
        total_students: students.len(),
        total_classes: classes.len(),
        total_teachers: distinct_teacher_count(classes),
        average_grade: average_grade_percent(grades),
    }
}

pub fn letter_for_percent(percent: f64) -> &'static str {
    if percent >= 90.0 {
        "A"
    } else if percent >= 80.0 {
        "B"
    } else if percent >= 70.0 {
        "C"
    } else if percent >= 60.0 {
        "D"
    } else {
        "F"
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LetterBucket {
    pub letter: &'static str,
    pub count: usize,
}

/// Buckets every grade record into exactly one letter band, emitted in
/// fixed A..F order so the chart axis is stable even at zero counts.
pub fn letter_grade_distribution(grades: &[Grade]) -> Vec<LetterBucket> {
    let mut buckets = ["A", "B", "C", "D", "F"]
        .into_iter()
        .map(|letter| LetterBucket { letter, count: 0 })
        .collect::<Vec<_>>();
    for g in grades {
        let letter = letter_for_percent(g.percent());
        if let Some(bucket) = buckets.iter_mut().find(|b| b.letter == letter) {
            bucket.count += 1;
        }
    }
    buckets
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GradeLevelCount {
    pub grade: String,
    pub count: usize,
}

/// Groups students by their grade-level string, ordered by the level's
/// numeric interpretation ascending. Levels that do not parse as numbers
/// sort after the numeric ones, alphabetically.
pub fn students_by_grade_level(students: &[Student]) -> Vec<GradeLevelCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for s in students {
        *counts.entry(s.grade.as_str()).or_insert(0) += 1;
    }
    let mut out = counts
        .into_iter()
        .map(|(grade, count)| GradeLevelCount {
            grade: grade.to_string(),
            count,
        })
        .collect::<Vec<_>>();
    out.sort_by(|a, b| match (a.grade.parse::<i64>(), b.grade.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.grade.cmp(&b.grade),
    });
    out
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAverage {
    pub subject: String,
    pub average: f64,
    pub count: usize,
}

/// Mean percentage per subject, descending by average (ties broken by
/// subject name for a stable chart order).
pub fn average_by_subject(grades: &[Grade]) -> Vec<SubjectAverage> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for g in grades {
        let entry = totals.entry(g.subject.as_str()).or_insert((0.0, 0));
        entry.0 += g.percent();
        entry.1 += 1;
    }
    let mut out = totals
        .into_iter()
        .map(|(subject, (total, count))| SubjectAverage {
            subject: subject.to_string(),
            average: round_1_decimal(total / count as f64),
            count,
        })
        .collect::<Vec<_>>();
    out.sort_by(|a, b| {
        b.average
            .partial_cmp(&a.average)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.subject.cmp(&b.subject))
    });
    out
}
