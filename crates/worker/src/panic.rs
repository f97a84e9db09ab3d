use std::any::Any;

/// Renders a panic payload as text.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&'static str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"non-string panic payload".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extracts_static_str_payload() {
		let err = std::panic::catch_unwind(|| panic!("boom-str")).unwrap_err();
		assert_eq!(panic_message(err.as_ref()), "boom-str");
	}

	#[test]
	fn extracts_string_payload() {
		let err = std::panic::catch_unwind(|| panic!("{}", String::from("boom-string"))).unwrap_err();
		assert_eq!(panic_message(err.as_ref()), "boom-string");
	}

	#[test]
	fn other_payloads_get_placeholder() {
		let err = std::panic::catch_unwind(|| std::panic::panic_any(42u8)).unwrap_err();
		assert_eq!(panic_message(err.as_ref()), "non-string panic payload");
	}
}
