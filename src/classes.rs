/// ImageNet VID classes, index 0 is background.
pub const VID_CLASSES: [&str; 31] = [
    "__background__",
    "airplane",
    "antelope",
    "bear",
    "bicycle",
    "bird",
    "bus",
    "car",
    "cattle",
    "dog",
    "domestic_cat",
    "elephant",
    "fox",
    "giant_panda",
    "hamster",
    "horse",
    "lion",
    "lizard",
    "monkey",
    "motorcycle",
    "rabbit",
    "red_panda",
    "sheep",
    "snake",
    "squirrel",
    "tiger",
    "train",
    "turtle",
    "watercraft",
    "whale",
    "zebra",
];

#[inline]
pub fn class_name(class_index: usize) -> &'static str {
    VID_CLASSES.get(class_index).copied().unwrap_or("unknown")
}

/// 1-based ILSVRC DET column of every VID class, 0 for background.
pub const VID_TO_DET: [usize; 31] = [
    0, 2, 4, 20, 24, 26, 33, 37, 39, 58, 59, 64, 70, 74, 84, 92, 103, 105, 113, 114, 141, 144, 155,
    159, 166, 182, 185, 188, 197, 198, 200,
];
