//! 문자 오프셋 ↔ LSP Position 변환
//!
//! 에디터 오프셋은 문자(char) 단위, LSP 컬럼은 UTF-16 코드 유닛 단위다.

use super::types::{Position, TextEdit};
use exnova_foundation::{Error, Result};

/// 문자 오프셋 → Position (텍스트 끝을 넘으면 끝으로)
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    let mut line = 0u32;
    let mut character = 0u32;

    for ch in text.chars().take(offset) {
        if ch == '\n' {
            line += 1;
            character = 0;
        } else {
            character += ch.len_utf16() as u32;
        }
    }

    Position::new(line, character)
}

/// Position → 문자 오프셋
///
/// 줄 길이를 넘는 컬럼은 줄 끝으로, 없는 줄은 텍스트 끝으로 맞춘다.
pub fn position_to_offset(text: &str, position: Position) -> usize {
    let mut line = 0u32;
    let mut column = 0u32;
    let mut previous_cr = false;

    for (offset, ch) in text.chars().enumerate() {
        if line == position.line {
            if column >= position.character {
                return offset;
            }
            if ch == '\n' {
                return if previous_cr { offset - 1 } else { offset };
            }
        }

        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += ch.len_utf16() as u32;
        }
        previous_cr = ch == '\r';
    }

    text.chars().count()
}

/// 편집 목록을 한 번에 적용한 결과
///
/// 모든 범위는 원본 텍스트 기준이다. 겹치는 편집은 에러.
pub fn apply_text_edits(text: &str, edits: &[TextEdit]) -> Result<String> {
    let chars: Vec<char> = text.chars().collect();

    let mut spans: Vec<(usize, usize, &str)> = edits
        .iter()
        .map(|edit| {
            (
                position_to_offset(text, edit.range.start),
                position_to_offset(text, edit.range.end),
                edit.new_text.as_str(),
            )
        })
        .collect();
    // 안정 정렬: 같은 위치의 삽입은 원래 순서 유지
    spans.sort_by_key(|(start, _, _)| *start);

    let mut result = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end, new_text) in spans {
        if start < cursor || end < start {
            return Err(Error::Lsp(format!(
                "Overlapping or inverted text edit at offset {}",
                start
            )));
        }
        result.extend(&chars[cursor..start]);
        result.push_str(new_text);
        cursor = end;
    }
    result.extend(&chars[cursor..]);

    Ok(result)
}
