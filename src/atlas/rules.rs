use super::{SubTextureRect, SubTextureTable};
use crate::error::TileError;

fn parse_field(field: &str) -> Result<f32, TileError> {
    let field = field.trim();
    field.parse::<f32>().map_err(|_| TileError::Parse {
        text: field.to_owned(),
    })
}

/// Parses sub-texture rules: one `left,top,width,height` record per line.
///
/// Trailing blank lines are ignored. An empty input yields an empty table;
/// callers reading from disk treat that as a load failure.
pub fn parse_rules(text: &str) -> Result<SubTextureTable, TileError> {
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let mut rects = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 4 {
            return Err(TileError::MalformedRecord {
                line: i + 1,
                text: (*line).to_owned(),
            });
        }
        rects.push(SubTextureRect::new(
            parse_field(fields[0])?,
            parse_field(fields[1])?,
            parse_field(fields[2])?,
            parse_field(fields[3])?,
        ));
    }
    Ok(SubTextureTable::from_rects(rects))
}
