/// Compose a flash message HTML snippet for known status or error codes.
pub fn compose_flash_message(status: Option<&str>, error: Option<&str>) -> String {
    if let Some(status) = status {
        let message = match status {
            "logged_out" => "You have been signed out.",
            "password_changed" => "Password updated.",
            "created" => "User added.",
            "removed" => "User removed.",
            "password_updated" => "Password reset. The user must choose a new one at next login.",
            "day_added" => "Day added to the itinerary.",
            "day_removed" => "Day removed.",
            "cleared" => "Itinerary cleared.",
            "title_saved" => "Tour title saved.",
            _ => "",
        };

        if !message.is_empty() {
            return format!(r#"<div class="flash success">{message}</div>"#);
        }
    }

    if let Some(error) = error {
        let message = match error {
            "invalid_credentials" => "Invalid username or password.",
            "store_unavailable" => {
                "Unable to reach the user directory. Please contact the administrator."
            }
            "duplicate" => "That username already exists.",
            "not_authorized" => "That page requires an admin account.",
            "missing_username" => "Please enter a username.",
            "missing_password" => "Please enter a password.",
            "user_missing" => "No such user.",
            "protected_user" => "That account cannot be removed.",
            "confirm_required" => "Tick the confirmation box to remove a user.",
            "password_mismatch" => "The passwords do not match.",
            "password_too_short" => "The password must be at least 4 characters.",
            "missing_route" => "Enter a route before adding a day.",
            "empty_itinerary" => "Add at least one day before exporting.",
            "unknown_format" => "Unknown export format.",
            "export_failed" => "The document could not be generated. Please try again.",
            _ => "Something went wrong. Please try again.",
        };

        return format!(r#"<div class="flash error">{message}</div>"#);
    }

    String::new()
}
