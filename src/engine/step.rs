use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    String(String),
    Real(f64),
    Integer(i64),
    Boolean(bool),
    Enum(String),
    Reference(u32),
    List(Vec<StepValue>),
    /// Measure-wrapped value such as `IFCLABEL('x')`.
    Typed {
        label: String,
        value: Box<StepValue>,
    },
    Null,
    Derived,
}

impl StepValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StepValue::String(s) => Some(s),
            StepValue::Typed { value, .. } => value.as_str(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_reference(&self) -> Option<u32> {
        match self {
            StepValue::Reference(id) => Some(*id),
            _ => None,
        }
    }

    /// References held by a list value, in order.
    #[must_use]
    pub fn references(&self) -> Vec<u32> {
        match self {
            StepValue::List(items) => items.iter().filter_map(StepValue::as_reference).collect(),
            StepValue::Reference(id) => vec![*id],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepEntity {
    pub id: u32,
    pub entity_type: String,
    pub values: Vec<StepValue>,
}

impl StepEntity {
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StepValue> {
        self.values.get(index)
    }
}

#[derive(Debug)]
pub struct StepFile {
    pub entities: HashMap<u32, StepEntity>,
    pub schema: String,
}

impl StepFile {
    pub fn parse(content: &str) -> Result<Self, ParseError> {
        if !content.trim_start().starts_with("ISO-10303-21") {
            return Err(ParseError::InvalidStep {
                message: "missing ISO-10303-21 header".to_string(),
            });
        }

        let schema = content
            .find("FILE_SCHEMA")
            .and_then(|start| {
                let rest = &content[start..];
                let open = rest.find('\'')?;
                let close = rest[open + 1..].find('\'')?;
                Some(rest[open + 1..open + 1 + close].to_string())
            })
            .unwrap_or_default();

        let data_start = content.find("DATA;").ok_or_else(|| ParseError::InvalidStep {
            message: "missing DATA section".to_string(),
        })?;

        let mut entities = HashMap::new();
        let data = strip_comments(&content[data_start + "DATA;".len()..]);
        for statement in split_statements(&data) {
            let statement = statement.trim();
            if statement == "ENDSEC" {
                break;
            }
            if statement.starts_with('#') {
                if let Some(entity) = Self::parse_entity(statement) {
                    entities.insert(entity.id, entity);
                }
            }
        }

        if entities.is_empty() {
            return Err(ParseError::InvalidStep {
                message: "DATA section holds no entities".to_string(),
            });
        }

        Ok(StepFile { entities, schema })
    }

    fn parse_entity(statement: &str) -> Option<StepEntity> {
        // Format: #123=IFCWALL('guid',#ref,'name',...)
        let eq_pos = statement.find('=')?;
        let id: u32 = statement[1..eq_pos].trim().parse().ok()?;

        let rest = statement[eq_pos + 1..].trim();
        let open = rest.find('(')?;
        let close = rest.rfind(')')?;
        if close < open {
            return None;
        }

        Some(StepEntity {
            id,
            entity_type: rest[..open].trim().to_ascii_uppercase(),
            values: Self::parse_values(&rest[open + 1..close]),
        })
    }

    fn parse_values(s: &str) -> Vec<StepValue> {
        let mut values = Vec::new();
        let mut current = String::new();
        let mut in_string = false;
        let mut paren_depth = 0usize;

        for ch in s.chars() {
            match ch {
                '\'' => {
                    in_string = !in_string;
                    current.push(ch);
                }
                '(' if !in_string => {
                    paren_depth += 1;
                    current.push(ch);
                }
                ')' if !in_string => {
                    paren_depth = paren_depth.saturating_sub(1);
                    current.push(ch);
                }
                ',' if !in_string && paren_depth == 0 => {
                    values.push(Self::parse_single_value(&current));
                    current.clear();
                }
                _ => current.push(ch),
            }
        }

        if !current.trim().is_empty() {
            values.push(Self::parse_single_value(&current));
        }

        values
    }

    fn parse_single_value(s: &str) -> StepValue {
        let s = s.trim();

        match s {
            "$" => return StepValue::Null,
            "*" => return StepValue::Derived,
            _ => {}
        }
        if let Some(id) = s.strip_prefix('#').and_then(|r| r.parse::<u32>().ok()) {
            return StepValue::Reference(id);
        }
        if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
            return StepValue::String(decode_step_string(&s[1..s.len() - 1]));
        }
        if s.len() >= 2 && s.starts_with('.') && s.ends_with('.') {
            return match &s[1..s.len() - 1] {
                "T" => StepValue::Boolean(true),
                "F" => StepValue::Boolean(false),
                other => StepValue::Enum(other.to_string()),
            };
        }
        if s.starts_with('(') && s.ends_with(')') {
            return StepValue::List(Self::parse_values(&s[1..s.len() - 1]));
        }
        if let Ok(i) = s.parse::<i64>() {
            return StepValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return StepValue::Real(f);
        }
        if let Some(open) = s.find('(') {
            let label = s[..open].trim();
            if s.ends_with(')') && !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric()) {
                return StepValue::Typed {
                    label: label.to_ascii_uppercase(),
                    value: Box::new(Self::parse_single_value(&s[open + 1..s.len() - 1])),
                };
            }
        }

        StepValue::String(s.to_string())
    }

    #[must_use]
    pub fn get_entity(&self, id: u32) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Entities of one type, ordered by id.
    #[must_use]
    pub fn get_entities_by_type(&self, entity_type: &str) -> Vec<&StepEntity> {
        let mut found: Vec<&StepEntity> = self
            .entities
            .values()
            .filter(|e| e.entity_type == entity_type)
            .collect();
        found.sort_by_key(|e| e.id);
        found
    }

    #[must_use]
    pub fn sorted_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// Removes `/* ... */` comments outside quoted strings.
fn strip_comments(data: &str) -> Cow<'_, str> {
    if !data.contains("/*") {
        return Cow::Borrowed(data);
    }

    let mut out = String::with_capacity(data.len());
    let mut in_string = false;
    let mut rest = data;
    while let Some(ch) = rest.chars().next() {
        if !in_string {
            if let Some(tail) = rest.strip_prefix("/*") {
                // an unterminated comment runs to the end
                rest = tail.find("*/").map_or("", |end| &tail[end + 2..]);
                continue;
            }
        }
        if ch == '\'' {
            in_string = !in_string;
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    Cow::Owned(out)
}

/// Splits the DATA section on `;` outside quoted strings.
fn split_statements(data: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut in_string = false;
    let mut start = 0;

    for (pos, ch) in data.char_indices() {
        match ch {
            '\'' => in_string = !in_string,
            ';' if !in_string => {
                statements.push(&data[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }

    statements
}

/// Decodes STEP string escapes: `\X2\hhhh..\X0\` (UTF-16 code units),
/// `\X\hh` (ISO 8859-1), `\S\c` (high half of ISO 8859-1), `\\` and `''`.
fn decode_step_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(ch) = rest.chars().next() {
        if let Some(tail) = rest.strip_prefix("\\X2\\") {
            let end = tail.find("\\X0\\").unwrap_or(tail.len());
            let units: Vec<u16> = tail[..end]
                .as_bytes()
                .chunks(4)
                .filter_map(|chunk| std::str::from_utf8(chunk).ok())
                .filter_map(|hex| u16::from_str_radix(hex, 16).ok())
                .collect();
            out.extend(char::decode_utf16(units).filter_map(Result::ok));
            rest = tail.get(end + 4..).unwrap_or("");
        } else if let Some(tail) = rest.strip_prefix("\\X\\") {
            match tail.get(..2).and_then(|hex| u8::from_str_radix(hex, 16).ok()) {
                Some(byte) => {
                    out.push(char::from(byte));
                    rest = &tail[2..];
                }
                None => {
                    out.push_str("\\X\\");
                    rest = tail;
                }
            }
        } else if let Some(tail) = rest.strip_prefix("\\S\\") {
            match tail.chars().next() {
                Some(c) if c.is_ascii() => {
                    out.push(char::from(c as u8 + 128));
                    rest = &tail[1..];
                }
                _ => rest = tail,
            }
        } else if let Some(tail) = rest.strip_prefix("\\\\") {
            out.push('\\');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("''") {
            out.push('\'');
            rest = tail;
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('0001',$,'Demo; project',$,$,$,$,(#2),$);
#2= IFCSIUNIT(*,.LENGTHUNIT.,.MILLI.,.METRE.);
#3=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);
#4=IFCPROPERTYSET('0002',$,'Pset_WallCommon',$,
  (#3,#5));
#5=IFCPROPERTYSINGLEVALUE('Reference',$,IFCIDENTIFIER('W-(1), ext'),$);
ENDSEC;
END-ISO-10303-21;
";

    #[test]
    fn parses_header_and_multiline_entities() {
        let file = StepFile::parse(SAMPLE).unwrap();
        assert_eq!(file.schema, "IFC4");
        assert_eq!(file.entities.len(), 5);
        assert_eq!(file.get_entity(4).unwrap().get(4).unwrap().references(), vec![3, 5]);
        assert_eq!(
            file.get_entity(1).unwrap().get(2).and_then(StepValue::as_str),
            Some("Demo; project")
        );
    }

    #[test]
    fn keeps_measure_labels() {
        let file = StepFile::parse(SAMPLE).unwrap();
        assert_eq!(
            file.get_entity(3).unwrap().get(2),
            Some(&StepValue::Typed {
                label: "IFCBOOLEAN".into(),
                value: Box::new(StepValue::Boolean(true)),
            })
        );
        assert_eq!(
            file.get_entity(5).unwrap().get(2).and_then(StepValue::as_str),
            Some("W-(1), ext")
        );
    }

    #[test]
    fn parses_enums_and_derived() {
        let file = StepFile::parse(SAMPLE).unwrap();
        let unit = file.get_entity(2).unwrap();
        assert_eq!(unit.get(0), Some(&StepValue::Derived));
        assert_eq!(unit.get(1), Some(&StepValue::Enum("LENGTHUNIT".into())));
    }

    #[test]
    fn rejects_non_step_content() {
        assert!(StepFile::parse("hello world").is_err());
        assert!(StepFile::parse("ISO-10303-21;\nHEADER;\nENDSEC;\n").is_err());
        assert!(StepFile::parse("ISO-10303-21;\nDATA;\nENDSEC;\n").is_err());
    }

    #[test]
    fn skips_comments_with_quotes_and_semicolons() {
        let content = "ISO-10303-21;\nHEADER;\nFILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n\
            /* exported by 'tool'; v2 */\n\
            #1=IFCPROJECT('p',$,'Demo /* not a comment */',$,$,$,$,$,$);\n\
            #2=IFCWALL('w',$,'Wall',$,$,$,$,$); /* it's; done\n*/\n\
            #3=IFCSLAB('s',$,'Slab',$,$,$,$,$,$);\nENDSEC;\nEND-ISO-10303-21;\n";
        let file = StepFile::parse(content).unwrap();
        assert_eq!(file.sorted_ids(), vec![1, 2, 3]);
        assert_eq!(
            file.get_entity(1).unwrap().get(2).and_then(StepValue::as_str),
            Some("Demo /* not a comment */")
        );
        assert_eq!(file.get_entity(3).unwrap().entity_type, "IFCSLAB");
        assert!(matches!(strip_comments("#1=A();"), Cow::Borrowed(_)));
    }

    #[test]
    fn decodes_string_escapes() {
        assert_eq!(decode_step_string("Wand \\X2\\00FC\\X0\\ber"), "Wand über");
        assert_eq!(decode_step_string("\\X\\E9t\\X\\E9"), "été");
        assert_eq!(decode_step_string("it''s"), "it's");
        assert_eq!(decode_step_string("a\\\\b"), "a\\b");
    }
}
