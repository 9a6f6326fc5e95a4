//! Report generation

pub mod generator;

use crate::models::BuildReport;

pub fn generate_report(report: &BuildReport) -> String {
    generator::generate_markdown_report(report)
}
