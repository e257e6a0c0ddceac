pub mod bid;
pub mod card;
pub mod deck;
pub mod hand;
pub mod hand_state;
pub mod rank;
pub mod rules;
pub mod score;
pub mod seat;
pub mod suit;
pub mod trick;
