//! Prompt construction for the generator.

use aircon_common::DeviceState;

/// System prompt, user query and, when known, the device state line
pub fn build_prompt(system_prompt: &str, query: &str, state: Option<&DeviceState>) -> String {
    let mut prompt = format!("{}\n\n{}", system_prompt.trim_end(), query.trim());
    if let Some(state) = state {
        prompt.push_str("\n\n");
        prompt.push_str(&describe_state(state));
    }
    prompt
}

fn describe_state(state: &DeviceState) -> String {
    format!(
        "Trạng thái hiện tại: phòng {:.1}°C, điều hòa {}, đặt {}°C, chế độ {}, quạt {}",
        state.room_temperature,
        if state.ac_on { "đang bật" } else { "đang tắt" },
        state.set_temperature(),
        state.mode(),
        state.fan_speed()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_state() {
        let p = build_prompt("SYS\n", "  nhiệt độ 31, độ ẩm 70%  ", None);
        assert_eq!(p, "SYS\n\nnhiệt độ 31, độ ẩm 70%");
    }

    #[test]
    fn test_prompt_with_state() {
        let state = DeviceState::new(31.25, true, 24.0);
        let p = build_prompt("SYS", "nóng quá", Some(&state));
        assert!(p.starts_with("SYS\n\nnóng quá\n\n"));
        assert!(p.contains("phòng 31.2°C") || p.contains("phòng 31.3°C"));
        assert!(p.contains("đang bật"));
        assert!(p.contains("đặt 24°C"));
        assert!(p.contains("chế độ COOL"));
    }
}
