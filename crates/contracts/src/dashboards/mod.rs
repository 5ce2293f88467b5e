pub mod d100_units_map;
