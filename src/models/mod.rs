pub mod lecture;
pub mod material;
pub mod reminder;
pub mod subject;

pub use lecture::{Lecture, MoveLectureRequest, MoveResponse, NewLectureRequest, Weekday};
pub use material::{Material, MaterialGroup, NewMaterialRequest};
pub use reminder::{Intensity, NewReminderRequest, Reminder, ReminderView};
pub use subject::{AttendanceChangeRequest, Counter, NewSubjectRequest, Subject, SubjectView, UpdateSubjectRequest};
