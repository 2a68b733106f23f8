mod divination;
mod follow_up;
mod hexagram;
