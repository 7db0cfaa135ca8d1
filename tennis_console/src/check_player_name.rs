use std::io;

const MAX_PLAYER_NAME_LENGTH: usize = 255;

// Returns the trimmed name accepted for play. Validation happens at the
// boundary: the scoring engine itself never sees a raw form value.
pub fn validate_player_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Player name is empty.".to_owned());
    }
    if name.chars().count() > MAX_PLAYER_NAME_LENGTH {
        return Err(format!(
            "Player name must be at most {MAX_PLAYER_NAME_LENGTH} characters long."
        ));
    }
    Ok(name.to_owned())
}

pub fn run(player_name: &str) -> io::Result<()> {
    match validate_player_name(player_name) {
        Ok(_) => {
            println!("OK");
            Ok(())
        }
        Err(err) => {
            eprintln!("Invalid player name {}: {}", player_name, err);
            Err(io::Error::from(io::ErrorKind::InvalidData))
        }
    }
}
